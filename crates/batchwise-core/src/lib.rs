//! # Batchwise Core
//!
//! Core types, errors, and the permission model for the Batchwise API.
//!
//! This crate provides foundational types used throughout the Batchwise application:
//!
//! - [`errors`]: Application error types with HTTP response conversion
//! - [`response`]: The uniform success envelope for mutating endpoints
//! - [`permissions`]: The typed role/module/operation permission matrix
//! - [`pagination`]: Pagination utilities for API responses
//! - [`password`]: Secure password hashing and verification
//!
//! # Example
//!
//! ```ignore
//! use batchwise_core::errors::AppError;
//! use batchwise_core::permissions::{Module, Operation, PermissionMatrix, RoleName};
//! use batchwise_core::password::{hash_password, verify_password};
//!
//! // Create an error
//! let error = AppError::not_found(anyhow::anyhow!("Batch not found"));
//!
//! // Hash a password
//! let hash = hash_password("secure_password")?;
//!
//! // Check a permission (default deny)
//! let matrix = PermissionMatrix::defaults_for(RoleName::Teacher);
//! let allowed = matrix.is_allowed(Module::Batch, Operation::Create);
//! ```

pub mod errors;
pub mod pagination;
pub mod password;
pub mod permissions;
pub mod response;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use response::ApiResponse;
pub use pagination::{PaginationMeta, PaginationParams};
pub use password::{hash_password, verify_password};
pub use permissions::{Module, Operation, PermissionMatrix, RoleName};
