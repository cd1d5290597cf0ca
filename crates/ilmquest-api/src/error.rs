//! API error types and JSON error response formatting.
//!
//! Internal failure details are logged and never echoed to the caller.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ilmquest_chat::ChatError;
use serde::{Deserialize, Serialize};

/// Message returned for any upstream failure.
pub const GENERIC_FAILURE: &str = "Failed to get response from AI";

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid parameters.
    BadRequest(String),
    /// 500 Internal Server Error - upstream or unexpected failure.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        if err.is_client_error() {
            return ApiError::BadRequest(err.to_string());
        }
        tracing::error!(error = %err, "Chat API error");
        ApiError::Internal(GENERIC_FAILURE.to_string())
    }
}

/// A request body the `Json` extractor refuses is a client error and gets
/// the same JSON body as every other failure.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "Rejected chat request body");
        ApiError::BadRequest(rejection.body_text())
    }
}
