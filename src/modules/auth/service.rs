//! Credential lifecycle: login, password rotation, self-service reset, and
//! email verification.
//!
//! Login failures are deliberately uniform: unknown email and wrong password
//! both return the same 401 so the endpoint cannot be used to probe which
//! addresses exist. Forgot-password is equally neutral, always answering 200.

use anyhow::anyhow;
use chrono::{Duration, Utc};
use tracing::instrument;
use uuid::Uuid;

use batchwise_auth::create_access_token;
use batchwise_config::JwtConfig;
use batchwise_core::{AppError, hash_password, verify_password};

use crate::store::Store;
use crate::utils::email::Mailer;
use crate::utils::token::{generate_token, hash_token};

use super::model::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse,
    ResetPasswordRequest,
};

fn invalid_credentials() -> AppError {
    AppError::unauthorized("Invalid email or password".to_string())
}

/// Authenticates an email/password pair and issues an access token.
///
/// Ordering matters: credentials are verified before any account-state
/// checks, so a deactivated account probed with a wrong password still gets
/// the uniform 401.
#[instrument(skip(store, jwt_config, dto), fields(email = %dto.email))]
pub async fn login(
    store: &dyn Store,
    jwt_config: &JwtConfig,
    dto: LoginRequest,
) -> Result<LoginResponse, AppError> {
    let mut user = store
        .find_user_by_email(&dto.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&dto.password, &user.password)? {
        return Err(invalid_credentials());
    }

    if !user.is_active {
        return Err(AppError::forbidden("Account is deactivated".to_string()));
    }

    let role = store
        .find_role_by_name(user.role_name)
        .await?
        .ok_or_else(|| AppError::forbidden("Account role no longer exists".to_string()))?;
    if !role.can_login {
        return Err(AppError::forbidden(
            "This account type is not permitted to log in".to_string(),
        ));
    }

    user.last_login = Some(Utc::now());
    store.save_user(&user).await?;

    let access_token = create_access_token(user.id, &user.email, user.role_name, jwt_config)?;
    let must_change_password = user.must_change_password;

    Ok(LoginResponse {
        access_token,
        user: user.into(),
        must_change_password,
    })
}

/// Rotates the caller's own password. Clears `must_change_password`, ending
/// the forced-rotation state for admin-provisioned accounts.
#[instrument(skip(store, dto))]
pub async fn change_password(
    store: &dyn Store,
    user_id: Uuid,
    dto: ChangePasswordRequest,
) -> Result<MessageResponse, AppError> {
    if dto.new_password != dto.confirm_password {
        return Err(AppError::bad_request(anyhow!(
            "New password and confirmation do not match"
        )));
    }

    let mut user = store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

    if !verify_password(&dto.current_password, &user.password)? {
        return Err(AppError::bad_request(anyhow!(
            "Current password is incorrect"
        )));
    }

    user.password = hash_password(&dto.new_password)?;
    user.must_change_password = false;
    store.save_user(&user).await?;

    Ok(MessageResponse::new("Password changed successfully"))
}

/// Starts a self-service reset. Only the sha256 digest of the token is
/// persisted; the raw token travels in the email alone. If the email send
/// fails the stored token fields are cleared again so no orphaned reset
/// window is left behind.
#[instrument(skip(store, mailer, dto), fields(email = %dto.email))]
pub async fn forgot_password(
    store: &dyn Store,
    mailer: &dyn Mailer,
    dto: ForgotPasswordRequest,
) -> Result<MessageResponse, AppError> {
    let neutral =
        MessageResponse::new("If an account exists for that email, a reset link has been sent");

    let Some(mut user) = store.find_user_by_email(&dto.email).await? else {
        return Ok(neutral);
    };
    if !user.is_active {
        return Ok(neutral);
    }

    let raw_token = generate_token();
    user.password_reset_token = Some(hash_token(&raw_token));
    user.password_reset_expires = Some(Utc::now() + Duration::hours(1));
    store.save_user(&user).await?;

    if let Err(e) = mailer
        .send_password_reset_email(&user.email, &user.full_name, &raw_token)
        .await
    {
        user.password_reset_token = None;
        user.password_reset_expires = None;
        store.save_user(&user).await?;
        return Err(e);
    }

    Ok(neutral)
}

/// Completes a self-service reset. The presented token is digested and
/// matched against the stored digest; expiry is checked before any write.
#[instrument(skip(store, dto))]
pub async fn reset_password(
    store: &dyn Store,
    dto: ResetPasswordRequest,
) -> Result<MessageResponse, AppError> {
    let digest = hash_token(&dto.token);

    let mut user = store
        .find_user_by_reset_token(&digest)
        .await?
        .ok_or_else(|| AppError::bad_request(anyhow!("Invalid or expired token")))?;

    let expires = user
        .password_reset_expires
        .ok_or_else(|| AppError::bad_request(anyhow!("Invalid or expired token")))?;
    if expires < Utc::now() {
        return Err(AppError::bad_request(anyhow!("Invalid or expired token")));
    }

    user.password = hash_password(&dto.new_password)?;
    user.password_reset_token = None;
    user.password_reset_expires = None;
    user.must_change_password = false;
    store.save_user(&user).await?;

    Ok(MessageResponse::new("Password reset successfully"))
}

/// Issues a fresh email-verification token (24h) and mails it, with the same
/// compensating cleanup as [`forgot_password`] when the send fails.
#[instrument(skip(store, mailer))]
pub async fn send_verification(
    store: &dyn Store,
    mailer: &dyn Mailer,
    user_id: Uuid,
) -> Result<MessageResponse, AppError> {
    let mut user = store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

    if user.is_email_verified {
        return Err(AppError::bad_request(anyhow!("Email is already verified")));
    }

    let raw_token = generate_token();
    user.email_verification_token = Some(hash_token(&raw_token));
    user.email_verification_expires = Some(Utc::now() + Duration::hours(24));
    store.save_user(&user).await?;

    if let Err(e) = mailer
        .send_verification_email(&user.email, &user.full_name, &raw_token)
        .await
    {
        user.email_verification_token = None;
        user.email_verification_expires = None;
        store.save_user(&user).await?;
        return Err(e);
    }

    Ok(MessageResponse::new("Verification email sent"))
}

/// Marks the owning account's email verified and consumes the token.
#[instrument(skip(store, token))]
pub async fn verify_email(store: &dyn Store, token: &str) -> Result<MessageResponse, AppError> {
    let digest = hash_token(token);

    let mut user = store
        .find_user_by_verification_token(&digest)
        .await?
        .ok_or_else(|| AppError::bad_request(anyhow!("Invalid or expired token")))?;

    let expires = user
        .email_verification_expires
        .ok_or_else(|| AppError::bad_request(anyhow!("Invalid or expired token")))?;
    if expires < Utc::now() {
        return Err(AppError::bad_request(anyhow!("Invalid or expired token")));
    }

    user.is_email_verified = true;
    user.email_verification_token = None;
    user.email_verification_expires = None;
    store.save_user(&user).await?;

    Ok(MessageResponse::new("Email verified successfully"))
}
