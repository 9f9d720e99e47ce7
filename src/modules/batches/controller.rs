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
    AssignStudentsDto, AssignTeacherDto, Batch, BatchFilterParams, CreateBatchDto, MoveStudentsDto,
    PaginatedBatchesResponse, RemoveStudentsDto, UpdateBatchDto,
};
use super::service;

const MUTATING_ROLES: &[RoleName] = &[RoleName::Admin, RoleName::Principal];
const READING_ROLES: &[RoleName] = &[RoleName::Admin, RoleName::Principal, RoleName::Teacher];

#[utoipa::path(
    post,
    path = "/api/batches",
    request_body = CreateBatchDto,
    responses(
        (status = 201, description = "Batch created successfully", body = ApiResponse<Batch>),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Batch name already in use")
    ),
    tag = "Batches",
    security(("bearer_auth" = []))
)]
pub async fn create_batch(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateBatchDto>,
) -> Result<(StatusCode, Json<ApiResponse<Batch>>), AppError> {
    check_any_role(&auth_user, MUTATING_ROLES)?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::Batch,
        Operation::Create,
    )
    .await?;

    let batch = service::create_batch(state.store.as_ref(), dto).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(batch))))
}

#[utoipa::path(
    get,
    path = "/api/batches",
    params(
        ("limit" = Option<i64>, Query, description = "Page size (max 100)"),
        ("offset" = Option<i64>, Query, description = "Rows to skip")
    ),
    responses(
        (status = 200, description = "List of batches", body = PaginatedBatchesResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Batches",
    security(("bearer_auth" = []))
)]
pub async fn get_batches(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<BatchFilterParams>,
) -> Result<Json<PaginatedBatchesResponse>, AppError> {
    check_any_role(&auth_user, READING_ROLES)?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::Batch,
        Operation::Read,
    )
    .await?;

    let result = service::get_batches(state.store.as_ref(), params).await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/batches/{id}",
    params(
        ("id" = Uuid, Path, description = "Batch ID")
    ),
    responses(
        (status = 200, description = "Batch details", body = Batch),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Batch not found")
    ),
    tag = "Batches",
    security(("bearer_auth" = []))
)]
pub async fn get_batch_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Batch>, AppError> {
    check_any_role(&auth_user, READING_ROLES)?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::Batch,
        Operation::Read,
    )
    .await?;

    let batch = service::get_batch_by_id(state.store.as_ref(), id).await?;
    Ok(Json(batch))
}

#[utoipa::path(
    put,
    path = "/api/batches/{id}",
    params(
        ("id" = Uuid, Path, description = "Batch ID")
    ),
    request_body = UpdateBatchDto,
    responses(
        (status = 200, description = "Batch updated successfully", body = ApiResponse<Batch>),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Batch not found")
    ),
    tag = "Batches",
    security(("bearer_auth" = []))
)]
pub async fn update_batch(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateBatchDto>,
) -> Result<Json<ApiResponse<Batch>>, AppError> {
    check_any_role(&auth_user, MUTATING_ROLES)?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::Batch,
        Operation::Update,
    )
    .await?;

    let batch = service::update_batch(state.store.as_ref(), id, dto).await?;
    Ok(Json(ApiResponse::success(batch)))
}

#[utoipa::path(
    delete,
    path = "/api/batches/{id}",
    params(
        ("id" = Uuid, Path, description = "Batch ID")
    ),
    responses(
        (status = 204, description = "Batch deleted; member back-references cleared"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Batch not found")
    ),
    tag = "Batches",
    security(("bearer_auth" = []))
)]
pub async fn delete_batch(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    check_any_role(&auth_user, MUTATING_ROLES)?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::Batch,
        Operation::Delete,
    )
    .await?;

    service::delete_batch(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/batches/{id}/assign-students",
    params(
        ("id" = Uuid, Path, description = "Batch ID")
    ),
    request_body = AssignStudentsDto,
    responses(
        (status = 200, description = "Roster replaced", body = ApiResponse<Batch>),
        (status = 400, description = "One or more student ids are invalid"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Batch not found")
    ),
    tag = "Batches",
    security(("bearer_auth" = []))
)]
pub async fn assign_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<AssignStudentsDto>,
) -> Result<Json<ApiResponse<Batch>>, AppError> {
    check_any_role(&auth_user, MUTATING_ROLES)?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::Batch,
        Operation::Update,
    )
    .await?;

    let batch = service::assign_students(state.store.as_ref(), id, dto).await?;
    Ok(Json(ApiResponse::success(batch)))
}

#[utoipa::path(
    post,
    path = "/api/batches/{id}/assign-teacher",
    params(
        ("id" = Uuid, Path, description = "Batch ID")
    ),
    request_body = AssignTeacherDto,
    responses(
        (status = 200, description = "Teacher assigned", body = ApiResponse<Batch>),
        (status = 400, description = "Teacher id is invalid"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Batch not found")
    ),
    tag = "Batches",
    security(("bearer_auth" = []))
)]
pub async fn assign_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<AssignTeacherDto>,
) -> Result<Json<ApiResponse<Batch>>, AppError> {
    check_any_role(&auth_user, MUTATING_ROLES)?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::Batch,
        Operation::Update,
    )
    .await?;

    let batch = service::assign_teacher(state.store.as_ref(), id, dto).await?;
    Ok(Json(ApiResponse::success(batch)))
}

#[utoipa::path(
    post,
    path = "/api/batches/{id}/remove-students",
    params(
        ("id" = Uuid, Path, description = "Batch ID")
    ),
    request_body = RemoveStudentsDto,
    responses(
        (status = 200, description = "Students removed from roster", body = ApiResponse<Batch>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Batch not found")
    ),
    tag = "Batches",
    security(("bearer_auth" = []))
)]
pub async fn remove_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<RemoveStudentsDto>,
) -> Result<Json<ApiResponse<Batch>>, AppError> {
    check_any_role(&auth_user, MUTATING_ROLES)?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::Batch,
        Operation::Update,
    )
    .await?;

    let batch = service::remove_students(state.store.as_ref(), id, dto).await?;
    Ok(Json(ApiResponse::success(batch)))
}

#[utoipa::path(
    post,
    path = "/api/batches/{id}/remove-teacher",
    params(
        ("id" = Uuid, Path, description = "Batch ID")
    ),
    responses(
        (status = 200, description = "Teacher slot cleared", body = ApiResponse<Batch>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Batch not found")
    ),
    tag = "Batches",
    security(("bearer_auth" = []))
)]
pub async fn remove_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Batch>>, AppError> {
    check_any_role(&auth_user, MUTATING_ROLES)?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::Batch,
        Operation::Update,
    )
    .await?;

    let batch = service::remove_teacher(state.store.as_ref(), id).await?;
    Ok(Json(ApiResponse::success(batch)))
}

#[utoipa::path(
    post,
    path = "/api/batches/move-students",
    request_body = MoveStudentsDto,
    responses(
        (status = 200, description = "Students moved; destination batch returned", body = ApiResponse<Batch>),
        (status = 400, description = "One or more student ids are invalid or not in the source batch"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Source or destination batch not found")
    ),
    tag = "Batches",
    security(("bearer_auth" = []))
)]
pub async fn move_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<MoveStudentsDto>,
) -> Result<Json<ApiResponse<Batch>>, AppError> {
    check_any_role(&auth_user, MUTATING_ROLES)?;
    require_permission(
        state.store.as_ref(),
        &auth_user,
        Module::Batch,
        Operation::Update,
    )
    .await?;

    let batch = service::move_students(state.store.as_ref(), dto).await?;
    Ok(Json(ApiResponse::success(batch)))
}
