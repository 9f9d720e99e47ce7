//! Batch management and the student/teacher assignment engine.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;
