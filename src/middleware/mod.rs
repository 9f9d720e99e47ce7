//! Authentication and authorization middleware.
//!
//! Per-request chain: the [`auth::AuthUser`] extractor validates the bearer
//! token (401 on failure), [`role::check_any_role`] checks role membership
//! (403), and [`role::require_permission`] consults the role's permission
//! matrix fresh from storage (403). Handlers compose whichever stages the
//! route needs.

pub mod auth;
pub mod role;
