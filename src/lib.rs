//! Batchwise: a role-based school management backend.
//!
//! Four surfaces hang off an Axum router: role management (fixed role
//! enumeration with per-role permission matrices), user administration,
//! batch/roster assignment, and the credential lifecycle. Persistence sits
//! behind the [`store::Store`] trait with a PostgreSQL implementation for
//! production and an in-memory one for tests.

pub mod docs;
pub mod logging;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod store;
pub mod utils;
pub mod validator;
