//! In-memory [`Store`] implementation.
//!
//! Backs the test suites and local development without Postgres. Each method
//! takes the relevant map's write lock for the duration of one entity update,
//! which gives the same atomic-single-entity guarantee the SQL implementation
//! gets from single-row statements.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use batchwise_core::{AppError, RoleName};

use crate::modules::batches::model::Batch;
use crate::modules::roles::model::Role;
use crate::modules::users::model::User;

use super::Store;

#[derive(Default)]
pub struct MemStore {
    roles: RwLock<HashMap<Uuid, Role>>,
    users: RwLock<HashMap<Uuid, User>>,
    batches: RwLock<HashMap<Uuid, Batch>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page<T: Clone>(mut items: Vec<T>, limit: i64, offset: i64) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let start = (offset.max(0) as usize).min(items.len());
    let end = (start + limit.max(0) as usize).min(items.len());
    items = items[start..end].to_vec();
    (items, total)
}

#[async_trait]
impl Store for MemStore {
    async fn insert_role(&self, role: Role) -> Result<Role, AppError> {
        let mut roles = self.roles.write().await;
        if roles.values().any(|r| r.name == role.name) {
            return Err(AppError::conflict(anyhow::anyhow!(
                "A role with this name already exists"
            )));
        }
        roles.insert(role.id, role.clone());
        Ok(role)
    }

    async fn find_role_by_id(&self, id: Uuid) -> Result<Option<Role>, AppError> {
        Ok(self.roles.read().await.get(&id).cloned())
    }

    async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>, AppError> {
        Ok(self
            .roles
            .read()
            .await
            .values()
            .find(|r| r.name == name)
            .cloned())
    }

    async fn list_roles(&self, limit: i64, offset: i64) -> Result<(Vec<Role>, i64), AppError> {
        let mut roles: Vec<Role> = self.roles.read().await.values().cloned().collect();
        roles.sort_by_key(|r| (r.created_at, r.id));
        Ok(page(roles, limit, offset))
    }

    async fn delete_role(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.roles.write().await.remove(&id).is_some())
    }

    async fn insert_user(&self, user: User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::conflict(anyhow::anyhow!(
                "A user with this email already exists"
            )));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_reset_token(&self, digest: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.password_reset_token.as_deref() == Some(digest))
            .cloned())
    }

    async fn find_user_by_verification_token(
        &self,
        digest: &str,
    ) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email_verification_token.as_deref() == Some(digest))
            .cloned())
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, AppError> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn list_users(&self, limit: i64, offset: i64) -> Result<(Vec<User>, i64), AppError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(page(users, limit, offset))
    }

    async fn save_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let existing = users
            .get_mut(&user.id)
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;
        // assigned_batches is owned by the atomic ref ops below.
        let assigned_batches = existing.assigned_batches.clone();
        *existing = user.clone();
        existing.assigned_batches = assigned_batches;
        existing.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn add_batch_ref(&self, user_id: Uuid, batch_id: Uuid) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if let Some(user) = users.get_mut(&user_id) {
            if !user.assigned_batches.contains(&batch_id) {
                user.assigned_batches.push(batch_id);
                user.updated_at = chrono::Utc::now();
            }
        }
        Ok(())
    }

    async fn remove_batch_ref(&self, user_id: Uuid, batch_id: Uuid) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if let Some(user) = users.get_mut(&user_id) {
            user.assigned_batches.retain(|b| *b != batch_id);
            user.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn users_with_batch_ref(&self, batch_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.assigned_batches.contains(&batch_id))
            .map(|u| u.id)
            .collect())
    }

    async fn insert_batch(&self, batch: Batch) -> Result<Batch, AppError> {
        let mut batches = self.batches.write().await;
        if batches.values().any(|b| b.name == batch.name) {
            return Err(AppError::conflict(anyhow::anyhow!(
                "A batch with this name already exists"
            )));
        }
        batches.insert(batch.id, batch.clone());
        Ok(batch)
    }

    async fn find_batch_by_id(&self, id: Uuid) -> Result<Option<Batch>, AppError> {
        Ok(self.batches.read().await.get(&id).cloned())
    }

    async fn list_batches(&self, limit: i64, offset: i64) -> Result<(Vec<Batch>, i64), AppError> {
        let mut batches: Vec<Batch> = self.batches.read().await.values().cloned().collect();
        batches.sort_by_key(|b| (b.created_at, b.id));
        Ok(page(batches, limit, offset))
    }

    async fn rename_batch(&self, id: Uuid, name: &str) -> Result<(), AppError> {
        let mut batches = self.batches.write().await;
        if batches.values().any(|b| b.id != id && b.name == name) {
            return Err(AppError::conflict(anyhow::anyhow!(
                "A batch with this name already exists"
            )));
        }
        let batch = batches
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Batch not found")))?;
        batch.name = name.to_string();
        batch.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn set_batch_students(&self, id: Uuid, students: &[Uuid]) -> Result<(), AppError> {
        let mut batches = self.batches.write().await;
        if let Some(batch) = batches.get_mut(&id) {
            batch.students = students.to_vec();
            batch.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn add_batch_students(&self, id: Uuid, students: &[Uuid]) -> Result<(), AppError> {
        let mut batches = self.batches.write().await;
        if let Some(batch) = batches.get_mut(&id) {
            for s in students {
                if !batch.students.contains(s) {
                    batch.students.push(*s);
                }
            }
            batch.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn remove_batch_students(&self, id: Uuid, students: &[Uuid]) -> Result<(), AppError> {
        let mut batches = self.batches.write().await;
        if let Some(batch) = batches.get_mut(&id) {
            batch.students.retain(|s| !students.contains(s));
            batch.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn set_batch_teacher(&self, id: Uuid, teacher: Option<Uuid>) -> Result<(), AppError> {
        let mut batches = self.batches.write().await;
        if let Some(batch) = batches.get_mut(&id) {
            batch.teacher = teacher;
            batch.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn delete_batch(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.batches.write().await.remove(&id).is_some())
    }
}
