// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Insufficient permissions: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("External store not configured")]
    NotConfigured,

    #[error("Auth service error: {0}")]
    AuthApi(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    /// Whether the client should offer a retry affordance.
    retryable: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details, retryable) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None, false),
            AppError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, "forbidden", Some(msg.clone()), false)
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, "not_found", Some(msg.clone()), false)
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()), false)
            }
            AppError::NotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "not_configured",
                Some("External store endpoint and key are missing or placeholders".to_string()),
                false,
            ),
            AppError::AuthApi(msg) => {
                (StatusCode::BAD_GATEWAY, "auth_error", Some(msg.clone()), true)
            }
            AppError::Store(msg) => {
                tracing::error!(error = %msg, "Store error");
                (StatusCode::BAD_GATEWAY, "store_error", None, true)
            }
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Storage error");
                (StatusCode::BAD_GATEWAY, "storage_error", None, true)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    None,
                    true,
                )
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            retryable,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
