use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use batchwise_core::{PaginationMeta, PaginationParams, PermissionMatrix, RoleName};

/// A named permission bundle. `permissions` is the role's grant matrix;
/// `is_system_role` roles are protected from deletion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: Uuid,
    pub name: RoleName,
    pub description: Option<String>,
    #[schema(value_type = Object)]
    pub permissions: PermissionMatrix,
    pub can_login: bool,
    pub is_system_role: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoleDto {
    /// One of: admin, teacher, student, principal
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
    /// Explicit grants merged on top of the role's default template.
    /// Entries set to `false` revoke template grants.
    #[schema(value_type = Object)]
    pub permissions: Option<PermissionMatrix>,
    /// Overrides the role-derived default (students default to false).
    pub can_login: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleFilterParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedRolesResponse {
    pub data: Vec<Role>,
    pub meta: PaginationMeta,
}
