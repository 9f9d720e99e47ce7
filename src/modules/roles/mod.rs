//! Role management: the fixed role enumeration, per-role permission
//! matrices, and the role CRUD surface.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
