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

use super::model::{
    AdminResetPasswordDto, AdminResetPasswordResponse, CreateUserDto, PaginatedUsersResponse,
    UserFilterParams, UserResponse,
};
use super::service;

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already in use")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    check_any_role(&auth_user, &[RoleName::Admin])?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::UserManagement,
        Operation::Create,
    )
    .await?;

    let user = service::create_user(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "List of users", body = PaginatedUsersResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn get_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<UserFilterParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    check_any_role(&auth_user, &[RoleName::Admin])?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::UserManagement,
        Operation::Read,
    )
    .await?;

    let result = service::get_users(state.store.as_ref(), params).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn get_user_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    check_any_role(&auth_user, &[RoleName::Admin])?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::UserManagement,
        Operation::Read,
    )
    .await?;

    let user = service::get_user_by_id(state.store.as_ref(), id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/deactivate",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deactivated", body = ApiResponse<UserResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn deactivate_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    check_any_role(&auth_user, &[RoleName::Admin])?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::UserManagement,
        Operation::Deactivate,
    )
    .await?;

    let user = service::deactivate_user(state.store.as_ref(), id).await?;
    Ok(Json(ApiResponse::success(user)))
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/reset-password",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = AdminResetPasswordDto,
    responses(
        (status = 200, description = "Password reset; temporary password returned once", body = ApiResponse<AdminResetPasswordResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    tag = "Users",
    security(("bearer_auth" = []))
)]
pub async fn admin_reset_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<AdminResetPasswordDto>,
) -> Result<Json<ApiResponse<AdminResetPasswordResponse>>, AppError> {
    check_any_role(&auth_user, &[RoleName::Admin])?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::UserManagement,
        Operation::Update,
    )
    .await?;

    let result = service::admin_reset_password(state.store.as_ref(), id, dto).await?;
    Ok(Json(ApiResponse::success(result)))
}
