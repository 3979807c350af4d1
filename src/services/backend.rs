// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SATRF backend API client.
//!
//! Handles:
//! - Bearer and session headers from the token store
//! - Analytics fetch and export
//! - Login/logout
//! - Token refresh on 401, with a single retry

use crate::error::AppError;
use crate::models::{LoginRequest, LoginResponse, RefreshResponse, UserAnalytics};
use crate::services::token_store::TokenStore;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Header carrying the stored session id.
pub const SESSION_HEADER: &str = "X-Session-ID";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const ANALYTICS_PATH: &str = "/users/dashboard/analytics";
const EXPORT_PATH: &str = "/users/dashboard/export";
const LOGIN_PATH: &str = "/users/login";
const LOGOUT_PATH: &str = "/users/logout";
const REFRESH_PATH: &str = "/users/refresh";

/// Backend API client bound to one token store.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    api_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl BackendClient {
    /// Create a client for a versioned API URL, e.g. `http://localhost:8000/api/v1`.
    pub fn new(
        api_url: impl Into<String>,
        timeout: Duration,
        tokens: Arc<dyn TokenStore>,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Fetch analytics for the given query parameters.
    pub async fn get_analytics(
        &self,
        query: &[(&'static str, String)],
    ) -> Result<UserAnalytics, AppError> {
        let response = self.get_authorized(ANALYTICS_PATH, query).await?;
        parse_json(response).await
    }

    /// Download an export as raw bytes.
    pub async fn export_analytics(
        &self,
        query: &[(&'static str, String)],
    ) -> Result<Vec<u8>, AppError> {
        let response = self.get_authorized(EXPORT_PATH, query).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to read export body: {}", e)))?;
        Ok(bytes.to_vec())
    }

    /// Exchange credentials for tokens. Does not touch the token store.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self
            .http
            .post(self.url(LOGIN_PATH))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Login request failed: {}", e)))?;

        let response = check_response(response).await?;
        parse_json(response).await
    }

    /// Tell the backend the session is over.
    pub async fn logout(&self) -> Result<(), AppError> {
        let response = self
            .authorize(self.http.post(self.url(LOGOUT_PATH)))
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Logout request failed: {}", e)))?;

        check_response(response).await?;
        Ok(())
    }

    /// Trade the stored refresh token for a new token pair and store it.
    pub async fn refresh_session(&self) -> Result<(), AppError> {
        let refresh_token = self
            .tokens
            .refresh_token()
            .ok_or(AppError::SessionExpired)?;

        let body = serde_json::json!({ "refresh_token": refresh_token });

        let response = self
            .authorize(self.http.post(self.url(REFRESH_PATH)))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Token refresh request failed: {}", e)))?;

        let response = check_response(response).await?;
        let refreshed: RefreshResponse = parse_json(response).await?;

        self.tokens
            .store_session(&refreshed.access_token, &refreshed.refresh_token, None)?;
        tracing::info!("Session tokens refreshed");
        Ok(())
    }

    /// GET with auth headers. A 401 triggers one refresh and one retry; if the
    /// refresh fails the stored session is cleared.
    async fn get_authorized(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<Response, AppError> {
        let url = self.url(path);

        let response = self
            .authorize(self.http.get(&url).query(query))
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return check_response(response).await;
        }

        tracing::info!(path, "Access token rejected, refreshing session");

        if let Err(e) = self.refresh_session().await {
            tracing::warn!(error = %e, "Session refresh failed, clearing stored tokens");
            if let Err(clear_err) = self.tokens.clear_session() {
                tracing::error!(error = %clear_err, "Failed to clear stored tokens");
            }
            return Err(AppError::SessionExpired);
        }

        let retry = self
            .authorize(self.http.get(&url).query(query))
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        check_response(retry).await
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request;
        if let Some(token) = self.tokens.access_token() {
            request = request.bearer_auth(token);
        }
        if let Some(session_id) = self.tokens.session_id() {
            request = request.header(SESSION_HEADER, session_id);
        }
        request
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

/// Check response status and return error if not successful.
async fn check_response(response: Response) -> Result<Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(AppError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::Backend(format!("HTTP {}: {}", status, body)))
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    response
        .json()
        .await
        .map_err(|e| AppError::Backend(format!("JSON parse error: {}", e)))
}
