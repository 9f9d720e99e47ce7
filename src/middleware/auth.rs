use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use batchwise_auth::{Claims, verify_token};
use batchwise_core::{AppError, RoleName};

use crate::state::AppState;

/// Extractor that validates the bearer token and carries the verified
/// identity (id, email, role name). This is the `TokenValidated` stage of
/// the authorization chain; role and permission checks build on top of it.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Get the user ID as UUID
    pub fn user_id(&self) -> Result<uuid::Uuid, AppError> {
        uuid::Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token".to_string()))
    }

    /// Get the user's email
    pub fn email(&self) -> &str {
        &self.0.email
    }

    /// Get the user's role name claim
    pub fn role(&self) -> RoleName {
        self.0.role
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::unauthorized("Invalid authorization header format".to_string())
        })?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_claims(role: RoleName) -> Claims {
        Claims {
            sub: uuid::Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role,
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    #[test]
    fn test_user_id_round_trip() {
        let user_id = uuid::Uuid::new_v4();
        let mut claims = test_claims(RoleName::Admin);
        claims.sub = user_id.to_string();
        let auth_user = AuthUser(claims);

        assert_eq!(auth_user.user_id().unwrap(), user_id);
        assert_eq!(auth_user.email(), "test@example.com");
        assert_eq!(auth_user.role(), RoleName::Admin);
    }

    #[test]
    fn test_invalid_subject_is_rejected() {
        let mut claims = test_claims(RoleName::Teacher);
        claims.sub = "not-a-uuid".to_string();
        let auth_user = AuthUser(claims);

        assert!(auth_user.user_id().is_err());
    }
}
