//! Role and permission checks layered on top of [`AuthUser`].
//!
//! The per-request chain is `TokenValidated → RoleChecked →
//! PermissionChecked`; each stage is independent, and routes use whatever
//! prefix of the chain they need. The permission stage re-reads the role
//! from storage rather than trusting anything cached in the token, so
//! editing a role's matrix takes effect for tokens issued before the edit.

use batchwise_core::{AppError, Module, Operation, RoleName};

use crate::middleware::auth::AuthUser;
use crate::store::Store;

/// `RoleChecked` stage: 403 unless the token's role claim is in the allowed set.
pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[RoleName]) -> Result<(), AppError> {
    let role = auth_user.role();
    if !allowed_roles.contains(&role) {
        return Err(AppError::forbidden(format!(
            "Access denied. Required roles: {:?}, but user has role: {}",
            allowed_roles, role
        )));
    }
    Ok(())
}

/// `PermissionChecked` stage: loads the caller's role fresh from the store
/// and consults its permission matrix. Default deny; a vanished role document
/// is also a deny.
pub async fn require_permission(
    store: &dyn Store,
    auth_user: &AuthUser,
    module: Module,
    operation: Operation,
) -> Result<(), AppError> {
    let role = store
        .find_role_by_name(auth_user.role())
        .await?
        .ok_or_else(|| {
            AppError::forbidden(format!("Role {} no longer exists", auth_user.role()))
        })?;

    if !role.permissions.is_allowed(module, operation) {
        return Err(AppError::forbidden(format!(
            "Access denied. Missing required permission: {:?}.{:?}",
            module, operation
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use batchwise_auth::Claims;

    fn auth_user(role: RoleName) -> AuthUser {
        AuthUser(Claims {
            sub: uuid::Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role,
            exp: 9999999999,
            iat: 1234567890,
        })
    }

    #[test]
    fn test_check_any_role_allows_member() {
        let user = auth_user(RoleName::Admin);
        assert!(check_any_role(&user, &[RoleName::Admin, RoleName::Principal]).is_ok());
    }

    #[test]
    fn test_check_any_role_rejects_outsider() {
        let user = auth_user(RoleName::Student);
        let err = check_any_role(&user, &[RoleName::Admin]).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::FORBIDDEN);
    }
}
