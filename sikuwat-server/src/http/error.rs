//! API error types with IntoResponse
//!
//! Errors are converted to `{"success": false, "error", "message"}` JSON
//! bodies with the matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use sikuwat_core::validation::Validation;

use crate::auth::AuthError;
use crate::chat::AssistantError;
use crate::db::repos::DbError;
use crate::storage::StorageError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Draft failed validation (400, lists every error)
    Validation(Validation),

    /// Malformed or incomplete request (400)
    BadRequest(String),

    /// Missing or rejected credentials (401)
    Unauthorized(String),

    /// Authenticated but not allowed (403)
    Forbidden(String),

    /// Resource not found (404)
    NotFound(String),

    /// Upload over the size limit (413)
    TooLarge(String),

    /// Generative API answered with an error status (502)
    Upstream { status: u16, body: String },

    /// Optional integration not configured (503)
    Unavailable(String),

    /// Database error (500, logged)
    Database(DbError),

    /// Internal error (500, logged)
    Internal(String),
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::TooLarge(_) => "payload_too_large",
            Self::Upstream { .. } => "upstream_error",
            Self::Unavailable(_) => "service_unavailable",
            Self::Database(_) | Self::Internal(_) => "internal_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match self {
            Self::Validation(report) => json!({
                "success": false,
                "error": code,
                "message": "Validation failed",
                "details": report.errors,
                "warnings": report.warnings,
            }),
            Self::Upstream { status, body } => json!({
                "success": false,
                "error": code,
                "message": format!("Generative API error: {} {}", status, body),
            }),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                json!({
                    "success": false,
                    "error": code,
                    "message": "Internal server error",
                })
            }
            Self::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                json!({
                    "success": false,
                    "error": code,
                    "message": "Internal server error",
                })
            }
            Self::BadRequest(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::TooLarge(message)
            | Self::Unavailable(message) => json!({
                "success": false,
                "error": code,
                "message": message,
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<Validation> for ApiError {
    fn from(report: Validation) -> Self {
        Self::Validation(report)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { .. } | DbError::NotOwned { .. } => Self::NotFound(capitalize(&e.to_string())),
            _ => Self::Database(e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidToken => Self::Unauthorized("Unauthorized".into()),
            AuthError::Rejected { message } => Self::BadRequest(message),
            AuthError::NotConfigured(what) => Self::Unavailable(what.to_string()),
            AuthError::Transport(_) | AuthError::UnexpectedResponse(_) => Self::Internal(e.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::UnsupportedType(_) | StorageError::Empty => Self::BadRequest(e.to_string()),
            StorageError::TooLarge => Self::TooLarge(e.to_string()),
            StorageError::Transport(_) | StorageError::Upstream { .. } | StorageError::Url(_) => {
                Self::Internal(e.to_string())
            }
        }
    }
}

impl From<AssistantError> for ApiError {
    fn from(e: AssistantError) -> Self {
        match e {
            AssistantError::Upstream { status, body } => Self::Upstream { status, body },
            other => Self::Internal(other.to_string()),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
