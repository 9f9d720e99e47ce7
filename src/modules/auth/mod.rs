//! Credential lifecycle endpoints: login, password rotation and reset,
//! email verification.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
