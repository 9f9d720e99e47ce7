use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use batchwise_core::{ApiResponse, PaginationMeta, PaginationParams};

use crate::modules::auth::model::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse,
    ResetPasswordRequest,
};
use crate::modules::batches::model::{
    AssignStudentsDto, AssignTeacherDto, Batch, CreateBatchDto, MoveStudentsDto,
    PaginatedBatchesResponse, RemoveStudentsDto, UpdateBatchDto,
};
use crate::modules::roles::model::{CreateRoleDto, PaginatedRolesResponse, Role};
use crate::modules::users::model::{
    AdminResetPasswordDto, AdminResetPasswordResponse, CreateUserDto, PaginatedUsersResponse,
    UserResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::change_password,
        crate::modules::auth::controller::forgot_password,
        crate::modules::auth::controller::reset_password,
        crate::modules::auth::controller::send_verification,
        crate::modules::auth::controller::verify_email,
        crate::modules::roles::controller::create_role,
        crate::modules::roles::controller::get_roles,
        crate::modules::roles::controller::get_role_by_id,
        crate::modules::roles::controller::delete_role,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user_by_id,
        crate::modules::users::controller::deactivate_user,
        crate::modules::users::controller::admin_reset_password,
        crate::modules::batches::controller::create_batch,
        crate::modules::batches::controller::get_batches,
        crate::modules::batches::controller::get_batch_by_id,
        crate::modules::batches::controller::update_batch,
        crate::modules::batches::controller::delete_batch,
        crate::modules::batches::controller::assign_students,
        crate::modules::batches::controller::assign_teacher,
        crate::modules::batches::controller::remove_students,
        crate::modules::batches::controller::remove_teacher,
        crate::modules::batches::controller::move_students,
    ),
    components(
        schemas(
            ApiResponse<LoginResponse>,
            ApiResponse<Role>,
            ApiResponse<UserResponse>,
            ApiResponse<AdminResetPasswordResponse>,
            ApiResponse<Batch>,
            LoginRequest,
            LoginResponse,
            ChangePasswordRequest,
            ForgotPasswordRequest,
            ResetPasswordRequest,
            MessageResponse,
            Role,
            CreateRoleDto,
            PaginatedRolesResponse,
            UserResponse,
            CreateUserDto,
            AdminResetPasswordDto,
            AdminResetPasswordResponse,
            PaginatedUsersResponse,
            Batch,
            CreateBatchDto,
            UpdateBatchDto,
            AssignStudentsDto,
            AssignTeacherDto,
            RemoveStudentsDto,
            MoveStudentsDto,
            PaginatedBatchesResponse,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login, password lifecycle, and email verification"),
        (name = "Roles", description = "Role and permission management"),
        (name = "Users", description = "User administration"),
        (name = "Batches", description = "Batch management and student/teacher assignment")
    ),
    info(
        title = "Batchwise API",
        version = "0.1.0",
        description = "Role-based school management backend built with Rust, Axum, and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
