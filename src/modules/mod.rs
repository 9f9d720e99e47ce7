pub mod auth;
pub mod batches;
pub mod roles;
pub mod users;
