use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{create_role, delete_role, get_role_by_id, get_roles};

pub fn init_roles_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_role).get(get_roles))
        .route("/{id}", get(get_role_by_id).delete(delete_role))
}
