// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Message shown to the user whenever an analytics load fails.
pub const LOAD_FAILURE_MESSAGE: &str = "Failed to load analytics data. Please try again.";

/// Where the dashboard should send the user once the session is gone.
pub const LOGIN_REDIRECT: &str = "/login";

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    /// Token refresh failed; stored tokens have been cleared.
    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Backend API error: {0}")]
    Backend(String),

    /// The cause is kept for logging only; callers see the fixed message.
    #[error("Failed to export analytics data")]
    Export(String),

    #[error("Token storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for errors that mean the stored session can no longer be used.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, AppError::Unauthorized | AppError::SessionExpired)
    }

    /// Underlying cause of an export failure, if this is one.
    pub fn export_cause(&self) -> Option<&str> {
        match self {
            AppError::Export(cause) => Some(cause),
            _ => None,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None),
            AppError::SessionExpired => (
                StatusCode::UNAUTHORIZED,
                "session_expired",
                Some(LOGIN_REDIRECT.to_string()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::Backend(msg) => {
                (StatusCode::BAD_GATEWAY, "backend_error", Some(msg.clone()))
            }
            AppError::Export(cause) => {
                tracing::error!(error = %cause, "Export failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "export_failed",
                    Some(self.to_string()),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!(error = %msg, "Token storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
