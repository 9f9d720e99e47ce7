//! Uniform success envelope for mutating endpoints.
//!
//! The error half of the contract lives in [`crate::errors`]: failures render
//! `{ "success": false, "error": { "status", "message" } }`. Successful
//! mutations render `{ "success": true, "message"?, "data"? }` through this
//! type; `message` and `data` are omitted from the wire when absent.

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}
