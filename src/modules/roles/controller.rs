use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use batchwise_core::{ApiResponse, AppError, Module, Operation, RoleName};

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{check_any_role, require_permission};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{CreateRoleDto, PaginatedRolesResponse, Role, RoleFilterParams};
use super::service;

#[utoipa::path(
    post,
    path = "/api/roles",
    request_body = CreateRoleDto,
    responses(
        (status = 201, description = "Role created successfully", body = ApiResponse<Role>),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Role already exists")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn create_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateRoleDto>,
) -> Result<(StatusCode, Json<ApiResponse<Role>>), AppError> {
    check_any_role(&auth_user, &[RoleName::Admin])?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::RoleManagement,
        Operation::Create,
    )
    .await?;

    let role = service::create_role(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(role))))
}

#[utoipa::path(
    get,
    path = "/api/roles",
    params(
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "List of roles", body = PaginatedRolesResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_roles(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<RoleFilterParams>,
) -> Result<Json<PaginatedRolesResponse>, AppError> {
    check_any_role(&auth_user, &[RoleName::Admin])?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::RoleManagement,
        Operation::Read,
    )
    .await?;

    let result = service::get_roles(state.store.as_ref(), params).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role details", body = Role),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn get_role_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Role>, AppError> {
    check_any_role(&auth_user, &[RoleName::Admin])?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::RoleManagement,
        Operation::Read,
    )
    .await?;

    let role = service::get_role_by_id(state.store.as_ref(), id).await?;
    Ok(Json(role))
}

#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    params(
        ("id" = Uuid, Path, description = "Role ID")
    ),
    responses(
        (status = 204, description = "Role deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Role not found")
    ),
    tag = "Roles",
    security(("bearer_auth" = []))
)]
pub async fn delete_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_any_role(&auth_user, &[RoleName::Admin])?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::RoleManagement,
        Operation::Delete,
    )
    .await?;

    service::delete_role(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
