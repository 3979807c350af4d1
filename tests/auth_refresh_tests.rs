// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token refresh on 401 and login against a mock backend.

use mockito::Matcher;
use satrf_analytics::error::{AppError, LOAD_FAILURE_MESSAGE};
use satrf_analytics::services::{
    AnalyticsOptions, LoadOutcome, MemoryTokenStore, SessionService, TokenStore,
};
use std::sync::Arc;

mod common;

#[tokio::test]
async fn test_expired_token_is_refreshed_and_retried() {
    let mut server = mockito::Server::new_async().await;
    let rejected = server
        .mock("GET", common::ANALYTICS_PATH)
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer access-1")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", common::REFRESH_PATH)
        .match_body(Matcher::PartialJsonString(
            r#"{"refresh_token": "refresh-1"}"#.to_string(),
        ))
        .with_status(200)
        .with_body(r#"{"access_token": "access-2", "refresh_token": "refresh-2"}"#)
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("GET", common::ANALYTICS_PATH)
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer access-2")
        .match_header("x-session-id", "session-1")
        .with_status(200)
        .with_body(common::analytics_body())
        .expect(1)
        .create_async()
        .await;

    let tokens = common::logged_in_tokens();
    let service =
        common::remote_service(&server.url(), tokens.clone(), AnalyticsOptions::default());

    assert_eq!(service.load_analytics().await, LoadOutcome::Fetched);
    assert_eq!(tokens.access_token().as_deref(), Some("access-2"));
    assert_eq!(tokens.refresh_token().as_deref(), Some("refresh-2"));
    assert_eq!(tokens.session_id().as_deref(), Some("session-1"));

    rejected.assert_async().await;
    refresh.assert_async().await;
    accepted.assert_async().await;
}

#[tokio::test]
async fn test_failed_refresh_clears_session() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", common::ANALYTICS_PATH)
        .match_query(Matcher::Any)
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("POST", common::REFRESH_PATH)
        .with_status(401)
        .expect(1)
        .create_async()
        .await;

    let tokens = common::logged_in_tokens();
    let backend = common::mock_backend(&server.url(), tokens.clone());

    let err = backend.get_analytics(&[]).await.unwrap_err();
    assert!(matches!(err, AppError::SessionExpired));
    assert!(err.is_auth_error());
    assert!(!tokens.is_authenticated());
    assert!(tokens.refresh_token().is_none());
    assert!(tokens.session_id().is_none());
}

#[tokio::test]
async fn test_session_expiry_surfaces_as_load_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", common::ANALYTICS_PATH)
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;
    server
        .mock("POST", common::REFRESH_PATH)
        .with_status(500)
        .create_async()
        .await;

    let tokens = common::logged_in_tokens();
    let service =
        common::remote_service(&server.url(), tokens.clone(), AnalyticsOptions::default());

    assert_eq!(service.load_analytics().await, LoadOutcome::Failed);
    assert_eq!(
        service.snapshot().await.error.as_deref(),
        Some(LOAD_FAILURE_MESSAGE)
    );
    assert!(!tokens.is_authenticated());
}

#[tokio::test]
async fn test_missing_refresh_token_skips_refresh_call() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", common::ANALYTICS_PATH)
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", common::REFRESH_PATH)
        .expect(0)
        .create_async()
        .await;

    let tokens = Arc::new(MemoryTokenStore::new());
    tokens.set("access_token", "access-only").unwrap();
    let backend = common::mock_backend(&server.url(), tokens.clone());

    let err = backend.get_analytics(&[]).await.unwrap_err();
    assert!(matches!(err, AppError::SessionExpired));
    refresh.assert_async().await;
}

#[tokio::test]
async fn test_backend_login_stores_tokens() {
    let mut server = mockito::Server::new_async().await;
    let login = server
        .mock("POST", common::LOGIN_PATH)
        .match_body(Matcher::Json(serde_json::json!({
            "email": "member@example.org",
            "password": "hunter22",
        })))
        .with_status(200)
        .with_body(
            r#"{
                "access_token": "access-9",
                "refresh_token": "refresh-9",
                "token_type": "bearer",
                "expires_in": 3600,
                "user": {"id": "member-9", "firstName": "Ann", "lastName": "Shot", "email": "member@example.org"}
            }"#,
        )
        .expect(1)
        .create_async()
        .await;

    let tokens = Arc::new(MemoryTokenStore::new());
    let backend = common::mock_backend(&server.url(), tokens.clone());
    let session = SessionService::new(Some(backend), tokens.clone());

    let user = session
        .login("member@example.org", "hunter22")
        .await
        .unwrap();

    assert_eq!(user.first_name, "Ann");
    assert_eq!(tokens.access_token().as_deref(), Some("access-9"));
    assert_eq!(tokens.session_id().as_deref(), Some("member-9"));
    login.assert_async().await;
}

#[tokio::test]
async fn test_rejected_login_stores_nothing() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", common::LOGIN_PATH)
        .with_status(401)
        .create_async()
        .await;

    let tokens = Arc::new(MemoryTokenStore::new());
    let backend = common::mock_backend(&server.url(), tokens.clone());
    let session = SessionService::new(Some(backend), tokens.clone());

    let err = session.login("member@example.org", "nope").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_logout_clears_tokens_even_if_backend_fails() {
    let mut server = mockito::Server::new_async().await;
    let logout = server
        .mock("POST", "/api/v1/users/logout")
        .match_header("authorization", "Bearer access-1")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let tokens = common::logged_in_tokens();
    let backend = common::mock_backend(&server.url(), tokens.clone());
    let session = SessionService::new(Some(backend), tokens.clone());

    session.logout().await.unwrap();
    assert!(!tokens.is_authenticated());
    logout.assert_async().await;
}
