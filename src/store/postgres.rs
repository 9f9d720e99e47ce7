//! Postgres [`Store`] implementation on sqlx.
//!
//! Reference sets (`users.assigned_batches`, `batches.students`) are `uuid[]`
//! columns mutated with single-statement array operations, and the permission
//! matrix is a JSONB column. Every trait method is one SQL statement against
//! one row, which is what the symmetry maintenance in the batch service
//! relies on.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use batchwise_core::{AppError, PermissionMatrix, RoleName};

use crate::modules::batches::model::Batch;
use crate::modules::roles::model::Role;
use crate::modules::users::model::User;

use super::Store;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode_err(column: &str, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: source.into(),
    }
}

fn role_name_from_str(s: &str, column: &str) -> Result<RoleName, sqlx::Error> {
    RoleName::parse(s).ok_or_else(|| decode_err(column, format!("unknown role name: {s}")))
}

fn role_from_row(row: &PgRow) -> Result<Role, sqlx::Error> {
    let name: String = row.try_get("name")?;
    let permissions: serde_json::Value = row.try_get("permissions")?;
    let permissions: PermissionMatrix =
        serde_json::from_value(permissions).map_err(|e| decode_err("permissions", e))?;

    Ok(Role {
        id: row.try_get("id")?,
        name: role_name_from_str(&name, "name")?,
        description: row.try_get("description")?,
        permissions,
        can_login: row.try_get("can_login")?,
        is_system_role: row.try_get("is_system_role")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    let role_name: String = row.try_get("role_name")?;

    Ok(User {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        password: row.try_get("password")?,
        role_id: row.try_get("role_id")?,
        role_name: role_name_from_str(&role_name, "role_name")?,
        phone: row.try_get("phone")?,
        address: row.try_get("address")?,
        assigned_batches: row.try_get("assigned_batches")?,
        must_change_password: row.try_get("must_change_password")?,
        is_active: row.try_get("is_active")?,
        is_email_verified: row.try_get("is_email_verified")?,
        last_login: row.try_get("last_login")?,
        password_reset_token: row.try_get("password_reset_token")?,
        password_reset_expires: row.try_get("password_reset_expires")?,
        email_verification_token: row.try_get("email_verification_token")?,
        email_verification_expires: row.try_get("email_verification_expires")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn batch_from_row(row: &PgRow) -> Result<Batch, sqlx::Error> {
    Ok(Batch {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        teacher: row.try_get("teacher")?,
        students: row.try_get("students")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_unique(e: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::conflict(anyhow::anyhow!("{}", message));
        }
    }
    AppError::from(e)
}

#[async_trait]
impl Store for PgStore {
    async fn insert_role(&self, role: Role) -> Result<Role, AppError> {
        let permissions = serde_json::to_value(&role.permissions)
            .map_err(|e| AppError::internal_error(format!("Failed to encode permissions: {e}")))?;

        sqlx::query(
            "INSERT INTO roles (id, name, description, permissions, can_login, is_system_role, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(role.id)
        .bind(role.name.as_str())
        .bind(&role.description)
        .bind(permissions)
        .bind(role.can_login)
        .bind(role.is_system_role)
        .bind(role.created_at)
        .bind(role.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "A role with this name already exists"))?;

        Ok(role)
    }

    async fn find_role_by_id(&self, id: Uuid) -> Result<Option<Role>, AppError> {
        let role = sqlx::query("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .try_map(|row: PgRow| role_from_row(&row))
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>, AppError> {
        let role = sqlx::query("SELECT * FROM roles WHERE name = $1")
            .bind(name.as_str())
            .try_map(|row: PgRow| role_from_row(&row))
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    async fn list_roles(&self, limit: i64, offset: i64) -> Result<(Vec<Role>, i64), AppError> {
        let roles = sqlx::query("SELECT * FROM roles ORDER BY created_at, id LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .try_map(|row: PgRow| role_from_row(&row))
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles")
            .fetch_one(&self.pool)
            .await?;

        Ok((roles, total))
    }

    async fn delete_role(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_user(&self, user: User) -> Result<User, AppError> {
        sqlx::query(
            "INSERT INTO users (id, full_name, email, password, role_id, role_name, phone, address,
                                assigned_batches, must_change_password, is_active, is_email_verified,
                                last_login, password_reset_token, password_reset_expires,
                                email_verification_token, email_verification_expires, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)",
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role_id)
        .bind(user.role_name.as_str())
        .bind(&user.phone)
        .bind(&user.address)
        .bind(&user.assigned_batches)
        .bind(user.must_change_password)
        .bind(user.is_active)
        .bind(user.is_email_verified)
        .bind(user.last_login)
        .bind(&user.password_reset_token)
        .bind(user.password_reset_expires)
        .bind(&user.email_verification_token)
        .bind(user.email_verification_expires)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "A user with this email already exists"))?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .try_map(|row: PgRow| user_from_row(&row))
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .try_map(|row: PgRow| user_from_row(&row))
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_reset_token(&self, digest: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query("SELECT * FROM users WHERE password_reset_token = $1")
            .bind(digest)
            .try_map(|row: PgRow| user_from_row(&row))
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_verification_token(
        &self,
        digest: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query("SELECT * FROM users WHERE email_verification_token = $1")
            .bind(digest)
            .try_map(|row: PgRow| user_from_row(&row))
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError> {
        let users = sqlx::query("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .try_map(|row: PgRow| user_from_row(&row))
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn list_users(&self, limit: i64, offset: i64) -> Result<(Vec<User>, i64), AppError> {
        let users = sqlx::query("SELECT * FROM users ORDER BY created_at, id LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(offset)
            .try_map(|row: PgRow| user_from_row(&row))
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok((users, total))
    }

    async fn save_user(&self, user: &User) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users SET full_name = $2, email = $3, password = $4, role_id = $5,
                              role_name = $6, phone = $7, address = $8,
                              must_change_password = $9, is_active = $10, is_email_verified = $11,
                              last_login = $12, password_reset_token = $13, password_reset_expires = $14,
                              email_verification_token = $15, email_verification_expires = $16,
                              updated_at = now()
             WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role_id)
        .bind(user.role_name.as_str())
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.must_change_password)
        .bind(user.is_active)
        .bind(user.is_email_verified)
        .bind(user.last_login)
        .bind(&user.password_reset_token)
        .bind(user.password_reset_expires)
        .bind(&user.email_verification_token)
        .bind(user.email_verification_expires)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "A user with this email already exists"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }
        Ok(())
    }

    async fn add_batch_ref(&self, user_id: Uuid, batch_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users SET assigned_batches = array_append(assigned_batches, $2), updated_at = now()
             WHERE id = $1 AND NOT ($2 = ANY(assigned_batches))",
        )
        .bind(user_id)
        .bind(batch_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_batch_ref(&self, user_id: Uuid, batch_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users SET assigned_batches = array_remove(assigned_batches, $2), updated_at = now()
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(batch_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn users_with_batch_ref(&self, batch_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM users WHERE $1 = ANY(assigned_batches)")
                .bind(batch_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(ids)
    }

    async fn insert_batch(&self, batch: Batch) -> Result<Batch, AppError> {
        sqlx::query(
            "INSERT INTO batches (id, name, teacher, students, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(batch.id)
        .bind(&batch.name)
        .bind(batch.teacher)
        .bind(&batch.students)
        .bind(batch.created_at)
        .bind(batch.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique(e, "A batch with this name already exists"))?;

        Ok(batch)
    }

    async fn find_batch_by_id(&self, id: Uuid) -> Result<Option<Batch>, AppError> {
        let batch = sqlx::query("SELECT * FROM batches WHERE id = $1")
            .bind(id)
            .try_map(|row: PgRow| batch_from_row(&row))
            .fetch_optional(&self.pool)
            .await?;
        Ok(batch)
    }

    async fn list_batches(&self, limit: i64, offset: i64) -> Result<(Vec<Batch>, i64), AppError> {
        let batches =
            sqlx::query("SELECT * FROM batches ORDER BY created_at, id LIMIT $1 OFFSET $2")
                .bind(limit)
                .bind(offset)
                .try_map(|row: PgRow| batch_from_row(&row))
                .fetch_all(&self.pool)
                .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM batches")
            .fetch_one(&self.pool)
            .await?;

        Ok((batches, total))
    }

    async fn rename_batch(&self, id: Uuid, name: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE batches SET name = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique(e, "A batch with this name already exists"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Batch not found")));
        }
        Ok(())
    }

    async fn set_batch_students(&self, id: Uuid, students: &[Uuid]) -> Result<(), AppError> {
        sqlx::query("UPDATE batches SET students = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(students)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn add_batch_students(&self, id: Uuid, students: &[Uuid]) -> Result<(), AppError> {
        // Appends only ids not already present, keeping existing order.
        sqlx::query(
            "UPDATE batches
             SET students = students || COALESCE(
                     (SELECT array_agg(e ORDER BY ord)
                      FROM unnest($2::uuid[]) WITH ORDINALITY AS t(e, ord)
                      WHERE NOT (e = ANY(batches.students))),
                     '{}'),
                 updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(students)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_batch_students(&self, id: Uuid, students: &[Uuid]) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE batches
             SET students = COALESCE(
                     (SELECT array_agg(e ORDER BY ord)
                      FROM unnest(batches.students) WITH ORDINALITY AS t(e, ord)
                      WHERE NOT (e = ANY($2::uuid[]))),
                     '{}'),
                 updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(students)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_batch_teacher(&self, id: Uuid, teacher: Option<Uuid>) -> Result<(), AppError> {
        sqlx::query("UPDATE batches SET teacher = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(teacher)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_batch(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM batches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
