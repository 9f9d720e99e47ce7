use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    admin_reset_password, create_user, deactivate_user, get_user_by_id, get_users,
};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user).get(get_users))
        .route("/{id}", get(get_user_by_id))
        .route("/{id}/deactivate", post(deactivate_user))
        .route("/{id}/reset-password", post(admin_reset_password))
}
