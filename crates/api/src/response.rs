//! Shared response envelope types for API handlers.
//!
//! Successful responses use a `{ "success": true, "data": ..., "message": ... }`
//! envelope. Use [`ApiResponse`] instead of ad-hoc `serde_json::json!` so the
//! shape stays consistent; errors are rendered by [`crate::error::AppError`].

use serde::Serialize;

/// Standard success envelope.
///
/// ```ignore
/// Ok(Json(ApiResponse::ok(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}
