//! Shared utilities: outbound email and one-time token material.

pub mod email;
pub mod token;
