// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use satrf_analytics::error::{AppError, LOGIN_REDIRECT};

mod common;

#[test]
fn test_is_auth_error() {
    assert!(AppError::Unauthorized.is_auth_error());
    assert!(AppError::SessionExpired.is_auth_error());
    assert!(!AppError::Backend("HTTP 500".to_string()).is_auth_error());
    assert!(!AppError::Export("timeout".to_string()).is_auth_error());
}

#[test]
fn test_export_error_hides_cause() {
    let err = AppError::Export("HTTP 500: stack trace".to_string());
    assert_eq!(err.to_string(), "Failed to export analytics data");
    assert_eq!(err.export_cause(), Some("HTTP 500: stack trace"));
    assert_eq!(AppError::Unauthorized.export_cause(), None);
}

#[tokio::test]
async fn test_session_expired_points_to_login() {
    let response = AppError::SessionExpired.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = common::body_json(response).await;
    assert_eq!(body["error"], "session_expired");
    assert_eq!(body["details"], LOGIN_REDIRECT);
}

#[tokio::test]
async fn test_status_mapping() {
    let cases = [
        (AppError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
        (AppError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST),
        (AppError::Backend("x".to_string()), StatusCode::BAD_GATEWAY),
        (AppError::Export("x".to_string()), StatusCode::BAD_GATEWAY),
        (
            AppError::Storage("x".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            AppError::Internal(anyhow::anyhow!("x")),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, status) in cases {
        assert_eq!(err.into_response().status(), status);
    }
}

#[tokio::test]
async fn test_internal_details_not_leaked() {
    let response = AppError::Internal(anyhow::anyhow!("secret path /etc/x")).into_response();
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "internal_error");
    assert!(body.get("details").is_none());
}
