//! User administration: account provisioning, listing, deactivation, and
//! admin-driven password resets for staff.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
