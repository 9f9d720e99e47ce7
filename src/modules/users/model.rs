use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use batchwise_core::{PaginationMeta, PaginationParams, RoleName};

/// Full user record as stored. Never serialized to clients directly; use
/// [`UserResponse`] for anything that leaves the service layer.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    /// bcrypt hash
    pub password: String,
    pub role_id: Uuid,
    /// Cached copy of the role's name at creation time.
    pub role_name: RoleName,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Back-references to batches this user teaches or belongs to.
    /// Set semantics; mirrors `Batch.students` / `Batch.teacher`.
    pub assigned_batches: Vec<Uuid>,
    pub must_change_password: bool,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    /// sha256 digest of the outstanding password reset token, if any.
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<chrono::DateTime<chrono::Utc>>,
    /// sha256 digest of the outstanding email verification token, if any.
    pub email_verification_token: Option<String>,
    pub email_verification_expires: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Public projection of a user. No password hash, no token fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role_id: Uuid,
    pub role_name: RoleName,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub assigned_batches: Vec<Uuid>,
    pub must_change_password: bool,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            role_id: user.role_id,
            role_name: user.role_name,
            phone: user.phone,
            address: user.address,
            assigned_batches: user.assigned_batches,
            must_change_password: user.must_change_password,
            is_active: user.is_active,
            is_email_verified: user.is_email_verified,
            last_login: user.last_login,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Full name must be between 1 and 100 characters"
    ))]
    pub full_name: String,
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role_id: Uuid,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdminResetPasswordDto {
    /// Temporary password to set. A random one is generated when omitted.
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: Option<String>,
}

/// Returned exactly once; the temporary password is not retrievable later.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminResetPasswordResponse {
    pub user_id: Uuid,
    pub temporary_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserFilterParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<UserResponse>,
    pub meta: PaginationMeta,
}
