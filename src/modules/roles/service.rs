use anyhow::anyhow;
use tracing::instrument;
use uuid::Uuid;

use batchwise_core::{AppError, PaginationMeta, PermissionMatrix, RoleName};

use crate::store::Store;

use super::model::{CreateRoleDto, PaginatedRolesResponse, Role, RoleFilterParams};

/// Creates a role from its default permission template, with caller-supplied
/// overrides merged on top. The name must belong to the fixed enumeration.
#[instrument(skip(store))]
pub async fn create_role(store: &dyn Store, dto: CreateRoleDto) -> Result<Role, AppError> {
    let name = RoleName::parse(&dto.name).ok_or_else(|| {
        AppError::bad_request(anyhow!(
            "Role name must be one of: admin, teacher, student, principal"
        ))
    })?;

    let mut permissions = PermissionMatrix::defaults_for(name);
    if let Some(overrides) = &dto.permissions {
        permissions.merge(overrides);
    }

    let now = chrono::Utc::now();
    let role = Role {
        id: Uuid::new_v4(),
        name,
        description: dto.description,
        permissions,
        can_login: dto.can_login.unwrap_or_else(|| name.can_login_default()),
        is_system_role: name.is_system_role_default(),
        created_at: now,
        updated_at: now,
    };

    store.insert_role(role).await
}

#[instrument(skip(store))]
pub async fn get_roles(
    store: &dyn Store,
    params: RoleFilterParams,
) -> Result<PaginatedRolesResponse, AppError> {
    let limit = params.pagination.limit();
    let offset = params.pagination.offset();

    let (roles, total) = store.list_roles(limit, offset).await?;
    let has_more = offset + (roles.len() as i64) < total;

    Ok(PaginatedRolesResponse {
        data: roles,
        meta: PaginationMeta {
            total,
            limit,
            offset: Some(offset),
            has_more,
        },
    })
}

#[instrument(skip(store))]
pub async fn get_role_by_id(store: &dyn Store, id: Uuid) -> Result<Role, AppError> {
    store
        .find_role_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Role not found")))
}

/// Deletes a role. System roles are protected and rejected with 403.
#[instrument(skip(store))]
pub async fn delete_role(store: &dyn Store, id: Uuid) -> Result<(), AppError> {
    let role = get_role_by_id(store, id).await?;

    if role.is_system_role {
        return Err(AppError::forbidden(
            "System roles cannot be deleted".to_string(),
        ));
    }

    store.delete_role(id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemStore;
    use batchwise_core::{Module, Operation};

    fn dto(name: &str) -> CreateRoleDto {
        CreateRoleDto {
            name: name.to_string(),
            description: None,
            permissions: None,
            can_login: None,
        }
    }

    #[tokio::test]
    async fn create_role_applies_default_template() {
        let store = MemStore::new();
        let role = create_role(&store, dto("teacher")).await.unwrap();

        assert_eq!(role.name, RoleName::Teacher);
        assert!(role.can_login);
        assert!(!role.is_system_role);
        // Teacher template has no batch.create grant.
        assert!(!role.permissions.is_allowed(Module::Batch, Operation::Create));
        assert!(role.permissions.is_allowed(Module::Grades, Operation::Assign));
    }

    #[tokio::test]
    async fn create_role_rejects_unknown_name() {
        let store = MemStore::new();
        let err = create_role(&store, dto("superuser")).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_role_rejects_duplicate_name() {
        let store = MemStore::new();
        create_role(&store, dto("teacher")).await.unwrap();
        let err = create_role(&store, dto("teacher")).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn create_role_merges_overrides_onto_template() {
        let store = MemStore::new();
        let mut overrides = PermissionMatrix::new();
        overrides.grant(Module::Batch, Operation::Create);

        let role = create_role(
            &store,
            CreateRoleDto {
                name: "teacher".to_string(),
                description: None,
                permissions: Some(overrides),
                can_login: None,
            },
        )
        .await
        .unwrap();

        assert!(role.permissions.is_allowed(Module::Batch, Operation::Create));
        assert!(role.permissions.is_allowed(Module::Attendance, Operation::Mark));
    }

    #[tokio::test]
    async fn student_role_cannot_login_by_default() {
        let store = MemStore::new();
        let role = create_role(&store, dto("student")).await.unwrap();
        assert!(!role.can_login);
    }

    #[tokio::test]
    async fn delete_rejects_system_role() {
        let store = MemStore::new();
        let admin = create_role(&store, dto("admin")).await.unwrap();
        assert!(admin.is_system_role);

        let err = delete_role(&store, admin.id).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::FORBIDDEN);
        // Still present.
        assert!(get_role_by_id(&store, admin.id).await.is_ok());
    }

    #[tokio::test]
    async fn delete_removes_regular_role() {
        let store = MemStore::new();
        let teacher = create_role(&store, dto("teacher")).await.unwrap();

        delete_role(&store, teacher.id).await.unwrap();
        let err = get_role_by_id(&store, teacher.id).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::NOT_FOUND);
    }
}
