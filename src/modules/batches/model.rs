use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use batchwise_core::{PaginationMeta, PaginationParams};

/// A class section. `teacher` and `students` are mirrored by each referenced
/// user's `assigned_batches` list; every mutation in the batch service
/// maintains that symmetry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Batch {
    pub id: Uuid,
    pub name: String,
    pub teacher: Option<Uuid>,
    pub students: Vec<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBatchDto {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBatchDto {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignStudentsDto {
    /// Full replacement roster.
    pub students: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignTeacherDto {
    pub teacher: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RemoveStudentsDto {
    pub students: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MoveStudentsDto {
    pub from: Uuid,
    pub to: Uuid,
    pub students: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchFilterParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedBatchesResponse {
    pub data: Vec<Batch>,
    pub meta: PaginationMeta,
}
