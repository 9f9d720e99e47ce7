use anyhow::anyhow;
use tracing::instrument;
use uuid::Uuid;

use batchwise_core::{AppError, PaginationMeta, hash_password};

use crate::store::Store;
use crate::utils::token::generate_temp_password;

use super::model::{
    AdminResetPasswordDto, AdminResetPasswordResponse, CreateUserDto, PaginatedUsersResponse, User,
    UserFilterParams, UserResponse,
};

/// Creates a user. The referenced role must exist; its name is denormalized
/// onto the user record. Staff accounts (teacher/principal) are provisioned
/// with `must_change_password` set.
#[instrument(skip(store, dto), fields(email = %dto.email))]
pub async fn create_user(store: &dyn Store, dto: CreateUserDto) -> Result<UserResponse, AppError> {
    let role = store.find_role_by_id(dto.role_id).await?.ok_or_else(|| {
        AppError::invalid_reference(format!("Role {} does not exist", dto.role_id))
    })?;

    let hashed_password = hash_password(&dto.password)?;
    let now = chrono::Utc::now();

    let user = User {
        id: Uuid::new_v4(),
        full_name: dto.full_name,
        email: dto.email,
        password: hashed_password,
        role_id: role.id,
        role_name: role.name,
        phone: dto.phone,
        address: dto.address,
        assigned_batches: Vec::new(),
        must_change_password: role.name.is_staff(),
        is_active: true,
        is_email_verified: false,
        last_login: None,
        password_reset_token: None,
        password_reset_expires: None,
        email_verification_token: None,
        email_verification_expires: None,
        created_at: now,
        updated_at: now,
    };

    let user = store.insert_user(user).await?;
    Ok(user.into())
}

#[instrument(skip(store))]
pub async fn get_users(
    store: &dyn Store,
    params: UserFilterParams,
) -> Result<PaginatedUsersResponse, AppError> {
    let limit = params.pagination.limit();
    let offset = params.pagination.offset();

    let (users, total) = store.list_users(limit, offset).await?;
    let has_more = offset + (users.len() as i64) < total;

    Ok(PaginatedUsersResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
        meta: PaginationMeta {
            total,
            limit,
            offset: Some(offset),
            has_more,
        },
    })
}

#[instrument(skip(store))]
pub async fn get_user_by_id(store: &dyn Store, id: Uuid) -> Result<UserResponse, AppError> {
    let user = store
        .find_user_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;
    Ok(user.into())
}

/// Soft-disables a user. Deactivated users are denied login; their batch
/// references stay intact.
#[instrument(skip(store))]
pub async fn deactivate_user(store: &dyn Store, id: Uuid) -> Result<UserResponse, AppError> {
    let mut user = store
        .find_user_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

    user.is_active = false;
    store.save_user(&user).await?;

    Ok(user.into())
}

/// Admin-driven password reset, limited to staff accounts (teacher or
/// principal). Generates a temporary password when none is supplied, forces
/// rotation, and returns the temporary password once, in-band.
#[instrument(skip(store, dto))]
pub async fn admin_reset_password(
    store: &dyn Store,
    id: Uuid,
    dto: AdminResetPasswordDto,
) -> Result<AdminResetPasswordResponse, AppError> {
    let mut user = store
        .find_user_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("User not found")))?;

    if !user.role_name.is_staff() {
        return Err(AppError::forbidden(
            "Password resets are limited to teacher and principal accounts".to_string(),
        ));
    }

    let temporary_password = dto.new_password.unwrap_or_else(generate_temp_password);

    user.password = hash_password(&temporary_password)?;
    user.must_change_password = true;
    store.save_user(&user).await?;

    Ok(AdminResetPasswordResponse {
        user_id: user.id,
        temporary_password,
    })
}
