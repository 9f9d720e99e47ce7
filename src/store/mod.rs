//! Persistence layer behind a trait.
//!
//! Services speak to a [`Store`] rather than a concrete database so the same
//! business logic runs against Postgres in production ([`postgres::PgStore`])
//! and against an in-memory map in tests ([`memory::MemStore`]).
//!
//! The contract matters more than the backend: every method is one atomic
//! operation against one entity. The batch service builds its cross-entity
//! symmetry maintenance out of these single-entity steps; there are no
//! cross-entity transactions (see the crate docs for the accepted race
//! window under concurrent writers).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use batchwise_core::{AppError, RoleName};

use crate::modules::batches::model::Batch;
use crate::modules::roles::model::Role;
use crate::modules::users::model::User;

#[async_trait]
pub trait Store: Send + Sync {
    // ---- Roles ----

    /// Inserts a role; fails with 409 when the name is already taken.
    async fn insert_role(&self, role: Role) -> Result<Role, AppError>;
    async fn find_role_by_id(&self, id: Uuid) -> Result<Option<Role>, AppError>;
    async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>, AppError>;
    async fn list_roles(&self, limit: i64, offset: i64) -> Result<(Vec<Role>, i64), AppError>;
    /// Returns false when no such role existed.
    async fn delete_role(&self, id: Uuid) -> Result<bool, AppError>;

    // ---- Users ----

    /// Inserts a user; fails with 409 when the email is already taken.
    async fn insert_user(&self, user: User) -> Result<User, AppError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    /// Lookup by the sha256 digest of a password reset token.
    async fn find_user_by_reset_token(&self, digest: &str) -> Result<Option<User>, AppError>;
    /// Lookup by the sha256 digest of an email verification token.
    async fn find_user_by_verification_token(&self, digest: &str)
    -> Result<Option<User>, AppError>;
    async fn find_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError>;
    async fn list_users(&self, limit: i64, offset: i64) -> Result<(Vec<User>, i64), AppError>;
    /// Writes back every mutable field of the user as one atomic update.
    /// `assigned_batches` is excluded; reference edits go through the
    /// dedicated atomic ops below.
    async fn save_user(&self, user: &User) -> Result<(), AppError>;

    // ---- User back-references (atomic set ops) ----

    /// Adds `batch_id` to the user's `assigned_batches` if absent. Idempotent.
    async fn add_batch_ref(&self, user_id: Uuid, batch_id: Uuid) -> Result<(), AppError>;
    /// Removes `batch_id` from the user's `assigned_batches`. No-op if absent.
    async fn remove_batch_ref(&self, user_id: Uuid, batch_id: Uuid) -> Result<(), AppError>;
    /// Ids of every user whose `assigned_batches` contains `batch_id`.
    async fn users_with_batch_ref(&self, batch_id: Uuid) -> Result<Vec<Uuid>, AppError>;

    // ---- Batches ----

    /// Inserts a batch; fails with 409 when the name is already taken.
    async fn insert_batch(&self, batch: Batch) -> Result<Batch, AppError>;
    async fn find_batch_by_id(&self, id: Uuid) -> Result<Option<Batch>, AppError>;
    async fn list_batches(&self, limit: i64, offset: i64) -> Result<(Vec<Batch>, i64), AppError>;
    /// Renames a batch; 409 when the new name is taken.
    async fn rename_batch(&self, id: Uuid, name: &str) -> Result<(), AppError>;
    /// Replaces the entire roster in one update.
    async fn set_batch_students(&self, id: Uuid, students: &[Uuid]) -> Result<(), AppError>;
    /// Appends ids not already present, preserving roster order.
    async fn add_batch_students(&self, id: Uuid, students: &[Uuid]) -> Result<(), AppError>;
    /// Removes the given ids from the roster. No-op for absent ids.
    async fn remove_batch_students(&self, id: Uuid, students: &[Uuid]) -> Result<(), AppError>;
    async fn set_batch_teacher(&self, id: Uuid, teacher: Option<Uuid>) -> Result<(), AppError>;
    /// Returns false when no such batch existed.
    async fn delete_batch(&self, id: Uuid) -> Result<bool, AppError>;
}
