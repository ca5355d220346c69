//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction so every campus endpoint
//! answers failures with the same `{error, code}` body.
//!
//! # Where it fits
//! Handlers and the auth guards use these helpers to return structured errors
//! and to translate store failures into HTTP responses.
//!
//! # Key invariants and assumptions
//! - `error` is human readable; `code` is stable and machine readable.
//! - Status codes must align with the error category.
//! - Rows hidden by tenant scoping are reported with [`api_not_found`], never
//!   with [`api_forbidden`].
//!
//! # Security considerations
//! - Internal errors log details server-side but return generic messages.
use crate::api::types::ErrorResponse;
use crate::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Structured API error returned by handlers.
///
/// # Invariants
/// - `status` must match the semantics of `body.code`.
///
/// # Example
/// ```rust
/// use axum::http::StatusCode;
/// use platform::api::error::ApiError;
/// use platform::api::types::ErrorResponse;
///
/// let err = ApiError {
///     status: StatusCode::NOT_FOUND,
///     body: ErrorResponse {
///         error: "Student not found".to_string(),
///         code: "not_found".to_string(),
///     },
/// };
/// ```
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, code: &str, message: &str) -> Self {
        ApiError {
            status,
            body: ErrorResponse {
                error: message.to_string(),
                code: code.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Build a 404 Not Found error.
///
/// Also used for rows that exist but sit outside the caller's tenant.
pub fn api_not_found(message: &str) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "not_found", message)
}

/// Build a 409 Conflict error with a caller-provided conflict code.
pub fn api_conflict(code: &str, message: &str) -> ApiError {
    ApiError::new(StatusCode::CONFLICT, code, message)
}

/// Build a 500 Internal Server Error from a store error.
///
/// # What it does
/// Logs the store error and returns a generic internal error response.
pub fn api_internal(message: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = ?err, "campus storage error");
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

/// Build a 500 Internal Server Error without a store error.
pub fn api_internal_message(message: &str) -> ApiError {
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

/// Build a 401 Unauthorized error.
pub fn api_unauthorized(message: &str) -> ApiError {
    ApiError::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

/// Build a 403 Forbidden error.
///
/// Reserved for role mismatches; tenant mismatches are not-found.
pub fn api_forbidden(message: &str) -> ApiError {
    ApiError::new(StatusCode::FORBIDDEN, "forbidden", message)
}

/// Build a 400 Bad Request validation error.
pub fn api_validation_error(message: &str) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "validation_error", message)
}
