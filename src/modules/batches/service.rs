//! Batch CRUD plus the assignment engine.
//!
//! Every assignment/removal operation maintains the referential symmetry
//! between `Batch.{students,teacher}` and each user's `assigned_batches`
//! list. Validation happens entirely before the first write (fail-fast, no
//! partial mutation); the writes themselves are composed from the store's
//! atomic single-entity operations.

use anyhow::anyhow;
use tracing::instrument;
use uuid::Uuid;

use batchwise_core::{AppError, PaginationMeta, RoleName};

use crate::store::Store;

use super::model::{
    AssignStudentsDto, AssignTeacherDto, Batch, BatchFilterParams, CreateBatchDto, MoveStudentsDto,
    PaginatedBatchesResponse, RemoveStudentsDto, UpdateBatchDto,
};

#[instrument(skip(store))]
pub async fn create_batch(store: &dyn Store, dto: CreateBatchDto) -> Result<Batch, AppError> {
    let now = chrono::Utc::now();
    let batch = Batch {
        id: Uuid::new_v4(),
        name: dto.name,
        teacher: None,
        students: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    store.insert_batch(batch).await
}

#[instrument(skip(store))]
pub async fn get_batches(
    store: &dyn Store,
    params: BatchFilterParams,
) -> Result<PaginatedBatchesResponse, AppError> {
    let limit = params.pagination.limit();
    let offset = params.pagination.offset();

    let (batches, total) = store.list_batches(limit, offset).await?;
    let has_more = offset + (batches.len() as i64) < total;

    Ok(PaginatedBatchesResponse {
        data: batches,
        meta: PaginationMeta {
            total,
            limit,
            offset: Some(offset),
            has_more,
        },
    })
}

#[instrument(skip(store))]
pub async fn get_batch_by_id(store: &dyn Store, id: Uuid) -> Result<Batch, AppError> {
    store
        .find_batch_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Batch not found")))
}

#[instrument(skip(store))]
pub async fn update_batch(
    store: &dyn Store,
    id: Uuid,
    dto: UpdateBatchDto,
) -> Result<Batch, AppError> {
    get_batch_by_id(store, id).await?;
    store.rename_batch(id, &dto.name).await?;
    get_batch_by_id(store, id).await
}

/// Deletes a batch, cascade-clearing the back-reference from every user that
/// still holds it (roster students and the teacher alike).
#[instrument(skip(store))]
pub async fn delete_batch(store: &dyn Store, id: Uuid) -> Result<(), AppError> {
    get_batch_by_id(store, id).await?;

    for user_id in store.users_with_batch_ref(id).await? {
        store.remove_batch_ref(user_id, id).await?;
    }

    store.delete_batch(id).await?;
    Ok(())
}

/// Deduplicate while preserving first-occurrence order.
fn dedupe(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Validates that every id refers to an existing user with the given role.
/// Returns the offending ids instead of failing on the first.
async fn validate_role_refs(
    store: &dyn Store,
    ids: &[Uuid],
    role: RoleName,
) -> Result<(), AppError> {
    let found = store.find_users_by_ids(ids).await?;
    let invalid: Vec<String> = ids
        .iter()
        .filter(|id| !found.iter().any(|u| u.id == **id && u.role_name == role))
        .map(|id| id.to_string())
        .collect();

    if !invalid.is_empty() {
        return Err(AppError::invalid_reference(format!(
            "Invalid {} ids: {}",
            role,
            invalid.join(", ")
        )));
    }
    Ok(())
}

/// Replaces a batch's entire student roster.
///
/// All ids are validated (existing users with the student role) before any
/// write. Users dropped from the roster lose their back-reference; every
/// member of the new roster gains one, idempotently.
#[instrument(skip(store))]
pub async fn assign_students(
    store: &dyn Store,
    batch_id: Uuid,
    dto: AssignStudentsDto,
) -> Result<Batch, AppError> {
    let batch = get_batch_by_id(store, batch_id).await?;
    let new_roster = dedupe(&dto.students);

    validate_role_refs(store, &new_roster, RoleName::Student).await?;

    store.set_batch_students(batch_id, &new_roster).await?;

    for previous in &batch.students {
        if !new_roster.contains(previous) {
            store.remove_batch_ref(*previous, batch_id).await?;
        }
    }
    for student in &new_roster {
        store.add_batch_ref(*student, batch_id).await?;
    }

    get_batch_by_id(store, batch_id).await
}

/// Single-slot teacher replacement. The previous teacher, if any, loses the
/// back-reference before the new teacher gains it.
#[instrument(skip(store))]
pub async fn assign_teacher(
    store: &dyn Store,
    batch_id: Uuid,
    dto: AssignTeacherDto,
) -> Result<Batch, AppError> {
    let batch = get_batch_by_id(store, batch_id).await?;

    let teacher = store
        .find_user_by_id(dto.teacher)
        .await?
        .filter(|u| u.role_name == RoleName::Teacher)
        .ok_or_else(|| {
            AppError::invalid_reference(format!("Invalid teacher id: {}", dto.teacher))
        })?;

    store.set_batch_teacher(batch_id, Some(teacher.id)).await?;

    if let Some(previous) = batch.teacher {
        if previous != teacher.id {
            store.remove_batch_ref(previous, batch_id).await?;
        }
    }
    store.add_batch_ref(teacher.id, batch_id).await?;

    get_batch_by_id(store, batch_id).await
}

/// Subtractive removal: the listed ids leave the roster and lose their
/// back-references. Ids not in the roster are a no-op, not an error.
#[instrument(skip(store))]
pub async fn remove_students(
    store: &dyn Store,
    batch_id: Uuid,
    dto: RemoveStudentsDto,
) -> Result<Batch, AppError> {
    get_batch_by_id(store, batch_id).await?;
    let ids = dedupe(&dto.students);

    store.remove_batch_students(batch_id, &ids).await?;
    for student in &ids {
        store.remove_batch_ref(*student, batch_id).await?;
    }

    get_batch_by_id(store, batch_id).await
}

/// Clears the teacher slot. No-op when no teacher is assigned.
#[instrument(skip(store))]
pub async fn remove_teacher(store: &dyn Store, batch_id: Uuid) -> Result<Batch, AppError> {
    let batch = get_batch_by_id(store, batch_id).await?;

    if let Some(previous) = batch.teacher {
        store.set_batch_teacher(batch_id, None).await?;
        store.remove_batch_ref(previous, batch_id).await?;
    }

    get_batch_by_id(store, batch_id).await
}

/// Moves students from one batch to another: remove-then-add with all
/// validation staged up front. Both batches must exist, every id must be a
/// student, and every id must currently be in the source roster; otherwise
/// nothing is written.
#[instrument(skip(store))]
pub async fn move_students(store: &dyn Store, dto: MoveStudentsDto) -> Result<Batch, AppError> {
    let source = get_batch_by_id(store, dto.from).await?;
    get_batch_by_id(store, dto.to).await?;
    let ids = dedupe(&dto.students);

    validate_role_refs(store, &ids, RoleName::Student).await?;

    let missing: Vec<String> = ids
        .iter()
        .filter(|id| !source.students.contains(id))
        .map(|id| id.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AppError::invalid_reference(format!(
            "Students not in source batch: {}",
            missing.join(", ")
        )));
    }

    store.remove_batch_students(dto.from, &ids).await?;
    for student in &ids {
        store.remove_batch_ref(*student, dto.from).await?;
    }

    store.add_batch_students(dto.to, &ids).await?;
    for student in &ids {
        store.add_batch_ref(*student, dto.to).await?;
    }

    get_batch_by_id(store, dto.to).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::roles::model::CreateRoleDto;
    use crate::modules::roles::service::create_role;
    use crate::modules::users::model::CreateUserDto;
    use crate::modules::users::service::create_user;
    use crate::store::memory::MemStore;

    struct Fixture {
        store: MemStore,
        teacher_a: Uuid,
        teacher_b: Uuid,
        students: Vec<Uuid>,
    }

    async fn fixture() -> Fixture {
        let store = MemStore::new();

        let mut role_ids = std::collections::HashMap::new();
        for name in ["teacher", "student"] {
            let role = create_role(
                &store,
                CreateRoleDto {
                    name: name.to_string(),
                    description: None,
                    permissions: None,
                    can_login: None,
                },
            )
            .await
            .unwrap();
            role_ids.insert(name, role.id);
        }

        let mut make_user = async |email: &str, role: &str| {
            create_user(
                &store,
                CreateUserDto {
                    full_name: email.to_string(),
                    email: email.to_string(),
                    password: "password123".to_string(),
                    role_id: role_ids[role],
                    phone: None,
                    address: None,
                },
            )
            .await
            .unwrap()
            .id
        };

        let teacher_a = make_user("ta@school.test", "teacher").await;
        let teacher_b = make_user("tb@school.test", "teacher").await;
        let mut students = Vec::new();
        for i in 0..5 {
            students.push(make_user(&format!("s{i}@school.test"), "student").await);
        }

        Fixture {
            store,
            teacher_a,
            teacher_b,
            students,
        }
    }

    async fn make_batch(store: &MemStore, name: &str) -> Batch {
        create_batch(
            store,
            CreateBatchDto {
                name: name.to_string(),
            },
        )
        .await
        .unwrap()
    }

    /// Symmetry check: roster membership and back-references agree exactly.
    async fn assert_symmetry(store: &MemStore, batch_id: Uuid) {
        let batch = store.find_batch_by_id(batch_id).await.unwrap().unwrap();
        let referencing = store.users_with_batch_ref(batch_id).await.unwrap();

        let mut expected: Vec<Uuid> = batch.students.clone();
        if let Some(teacher) = batch.teacher {
            expected.push(teacher);
        }
        let expected: std::collections::HashSet<Uuid> = expected.into_iter().collect();
        let actual: std::collections::HashSet<Uuid> = referencing.into_iter().collect();
        assert_eq!(expected, actual);
    }

    #[tokio::test]
    async fn assign_students_replaces_roster_and_back_references() {
        let f = fixture().await;
        let batch = make_batch(&f.store, "Batch A").await;

        assign_students(
            &f.store,
            batch.id,
            AssignStudentsDto {
                students: f.students[..3].to_vec(),
            },
        )
        .await
        .unwrap();
        assert_symmetry(&f.store, batch.id).await;

        // Replace with a partially overlapping roster.
        let updated = assign_students(
            &f.store,
            batch.id,
            AssignStudentsDto {
                students: f.students[2..5].to_vec(),
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.students, f.students[2..5].to_vec());
        assert_symmetry(&f.store, batch.id).await;

        // Dropped student lost the back-reference.
        let dropped = f.store.find_user_by_id(f.students[0]).await.unwrap().unwrap();
        assert!(!dropped.assigned_batches.contains(&batch.id));
    }

    #[tokio::test]
    async fn assign_students_is_idempotent() {
        let f = fixture().await;
        let batch = make_batch(&f.store, "Batch A").await;
        let roster = f.students[..3].to_vec();

        let first = assign_students(
            &f.store,
            batch.id,
            AssignStudentsDto {
                students: roster.clone(),
            },
        )
        .await
        .unwrap();
        let second = assign_students(
            &f.store,
            batch.id,
            AssignStudentsDto {
                students: roster.clone(),
            },
        )
        .await
        .unwrap();

        assert_eq!(first.students, second.students);
        for id in &roster {
            let user = f.store.find_user_by_id(*id).await.unwrap().unwrap();
            assert_eq!(
                user.assigned_batches.iter().filter(|b| **b == batch.id).count(),
                1
            );
        }
        assert_symmetry(&f.store, batch.id).await;
    }

    #[tokio::test]
    async fn assign_students_fails_fast_on_invalid_id() {
        let f = fixture().await;
        let batch = make_batch(&f.store, "Batch A").await;

        assign_students(
            &f.store,
            batch.id,
            AssignStudentsDto {
                students: f.students[..2].to_vec(),
            },
        )
        .await
        .unwrap();

        let bogus = Uuid::new_v4();
        let mut roster = f.students.clone();
        roster.push(bogus);

        let err = assign_students(&f.store, batch.id, AssignStudentsDto { students: roster })
            .await
            .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert!(err.error.to_string().contains(&bogus.to_string()));

        // Roster completely unchanged.
        let unchanged = f.store.find_batch_by_id(batch.id).await.unwrap().unwrap();
        assert_eq!(unchanged.students, f.students[..2].to_vec());
        assert_symmetry(&f.store, batch.id).await;
    }

    #[tokio::test]
    async fn assign_students_rejects_non_student_role() {
        let f = fixture().await;
        let batch = make_batch(&f.store, "Batch A").await;

        let err = assign_students(
            &f.store,
            batch.id,
            AssignStudentsDto {
                students: vec![f.teacher_a],
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn assign_teacher_replacement_moves_back_reference() {
        let f = fixture().await;
        let batch = make_batch(&f.store, "Batch A").await;

        assign_teacher(
            &f.store,
            batch.id,
            AssignTeacherDto {
                teacher: f.teacher_a,
            },
        )
        .await
        .unwrap();
        let updated = assign_teacher(
            &f.store,
            batch.id,
            AssignTeacherDto {
                teacher: f.teacher_b,
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.teacher, Some(f.teacher_b));

        let a = f.store.find_user_by_id(f.teacher_a).await.unwrap().unwrap();
        let b = f.store.find_user_by_id(f.teacher_b).await.unwrap().unwrap();
        assert!(!a.assigned_batches.contains(&batch.id));
        assert!(b.assigned_batches.contains(&batch.id));
        assert_symmetry(&f.store, batch.id).await;
    }

    #[tokio::test]
    async fn assign_teacher_rejects_student_id() {
        let f = fixture().await;
        let batch = make_batch(&f.store, "Batch A").await;

        let err = assign_teacher(
            &f.store,
            batch.id,
            AssignTeacherDto {
                teacher: f.students[0],
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn remove_students_is_subtractive_and_tolerates_absent_ids() {
        let f = fixture().await;
        let batch = make_batch(&f.store, "Batch A").await;

        assign_students(
            &f.store,
            batch.id,
            AssignStudentsDto {
                students: f.students[..3].to_vec(),
            },
        )
        .await
        .unwrap();

        // One present, one absent from the roster.
        let updated = remove_students(
            &f.store,
            batch.id,
            RemoveStudentsDto {
                students: vec![f.students[0], f.students[4]],
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.students, f.students[1..3].to_vec());
        assert_symmetry(&f.store, batch.id).await;
    }

    #[tokio::test]
    async fn remove_teacher_is_noop_when_unassigned() {
        let f = fixture().await;
        let batch = make_batch(&f.store, "Batch A").await;

        let updated = remove_teacher(&f.store, batch.id).await.unwrap();
        assert_eq!(updated.teacher, None);

        assign_teacher(
            &f.store,
            batch.id,
            AssignTeacherDto {
                teacher: f.teacher_a,
            },
        )
        .await
        .unwrap();
        let cleared = remove_teacher(&f.store, batch.id).await.unwrap();
        assert_eq!(cleared.teacher, None);

        let a = f.store.find_user_by_id(f.teacher_a).await.unwrap().unwrap();
        assert!(!a.assigned_batches.contains(&batch.id));
        assert_symmetry(&f.store, batch.id).await;
    }

    #[tokio::test]
    async fn move_students_transfers_roster_and_references() {
        let f = fixture().await;
        let batch_a = make_batch(&f.store, "Batch A").await;
        let batch_b = make_batch(&f.store, "Batch B").await;

        assign_students(
            &f.store,
            batch_a.id,
            AssignStudentsDto {
                students: f.students[..3].to_vec(),
            },
        )
        .await
        .unwrap();

        move_students(
            &f.store,
            MoveStudentsDto {
                from: batch_a.id,
                to: batch_b.id,
                students: f.students[..2].to_vec(),
            },
        )
        .await
        .unwrap();

        let a = f.store.find_batch_by_id(batch_a.id).await.unwrap().unwrap();
        let b = f.store.find_batch_by_id(batch_b.id).await.unwrap().unwrap();
        assert_eq!(a.students, vec![f.students[2]]);
        assert_eq!(b.students, f.students[..2].to_vec());
        assert_symmetry(&f.store, batch_a.id).await;
        assert_symmetry(&f.store, batch_b.id).await;
    }

    #[tokio::test]
    async fn move_students_fails_atomically_when_not_in_source() {
        let f = fixture().await;
        let batch_a = make_batch(&f.store, "Batch A").await;
        let batch_b = make_batch(&f.store, "Batch B").await;

        assign_students(
            &f.store,
            batch_a.id,
            AssignStudentsDto {
                students: vec![f.students[0]],
            },
        )
        .await
        .unwrap();

        // students[1] exists but is not in batch A.
        let err = move_students(
            &f.store,
            MoveStudentsDto {
                from: batch_a.id,
                to: batch_b.id,
                students: vec![f.students[0], f.students[1]],
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);

        // Both batches unchanged.
        let a = f.store.find_batch_by_id(batch_a.id).await.unwrap().unwrap();
        let b = f.store.find_batch_by_id(batch_b.id).await.unwrap().unwrap();
        assert_eq!(a.students, vec![f.students[0]]);
        assert!(b.students.is_empty());
        assert_symmetry(&f.store, batch_a.id).await;
        assert_symmetry(&f.store, batch_b.id).await;
    }

    #[tokio::test]
    async fn delete_batch_cascade_clears_back_references() {
        let f = fixture().await;
        let batch = make_batch(&f.store, "Batch A").await;

        assign_students(
            &f.store,
            batch.id,
            AssignStudentsDto {
                students: f.students[..3].to_vec(),
            },
        )
        .await
        .unwrap();
        assign_teacher(
            &f.store,
            batch.id,
            AssignTeacherDto {
                teacher: f.teacher_a,
            },
        )
        .await
        .unwrap();

        delete_batch(&f.store, batch.id).await.unwrap();

        assert!(f.store.find_batch_by_id(batch.id).await.unwrap().is_none());
        assert!(f
            .store
            .users_with_batch_ref(batch.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn create_batch_rejects_duplicate_name() {
        let f = fixture().await;
        make_batch(&f.store, "Batch A").await;

        let err = create_batch(
            &f.store,
            CreateBatchDto {
                name: "Batch A".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn operations_on_missing_batch_are_not_found() {
        let f = fixture().await;
        let bogus = Uuid::new_v4();

        let err = assign_students(
            &f.store,
            bogus,
            AssignStudentsDto {
                students: vec![f.students[0]],
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::NOT_FOUND);

        let err = remove_teacher(&f.store, bogus).await.unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::NOT_FOUND);
    }
}
