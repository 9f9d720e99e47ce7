use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    assign_students, assign_teacher, create_batch, delete_batch, get_batch_by_id, get_batches,
    move_students, remove_students, remove_teacher, update_batch,
};

pub fn init_batches_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_batch).get(get_batches))
        .route(
            "/{id}",
            get(get_batch_by_id).put(update_batch).delete(delete_batch),
        )
        // Assignment engine
        .route("/{id}/assign-students", post(assign_students))
        .route("/{id}/assign-teacher", post(assign_teacher))
        .route("/{id}/remove-students", post(remove_students))
        .route("/{id}/remove-teacher", post(remove_teacher))
        .route("/move-students", post(move_students))
}
