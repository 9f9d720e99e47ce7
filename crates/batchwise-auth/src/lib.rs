//! # Batchwise Auth
//!
//! Authentication types and JWT utilities for the Batchwise API.
//!
//! This crate provides:
//!
//! - [`claims`]: the access token claim structure
//! - [`jwt`]: token creation and verification utilities
//!
//! The API issues a single kind of token: a short-lived access token carrying
//! the user's id, email, and role name. Authorization decisions deliberately
//! do NOT trust the role's permissions at token-issue time; guards re-read
//! the role from storage on every request so permission edits take effect
//! immediately.
//!
//! # Example
//!
//! ```ignore
//! use batchwise_auth::{create_access_token, verify_token};
//! use batchwise_config::JwtConfig;
//! use batchwise_core::RoleName;
//!
//! let config = JwtConfig::from_env();
//!
//! let token = create_access_token(user_id, "user@example.com", RoleName::Teacher, &config)?;
//!
//! let claims = verify_token(&token, &config)?;
//! println!("User ID: {}", claims.sub);
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
