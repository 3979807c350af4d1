// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member login and logout against the backend's `/users` endpoints.

use crate::error::AppError;
use crate::models::SessionUser;
use crate::services::backend::BackendClient;
use crate::services::token_store::TokenStore;
use std::sync::Arc;

/// Built-in demo account, accepted without contacting the backend.
pub const DEMO_EMAIL: &str = "demo@satrf.org.za";
const DEMO_PASSWORD: &str = "DemoPass123";
const DEMO_USER_ID: &str = "demo-user-123";
const DEMO_ACCESS_TOKEN: &str = "demo-access-token";
const DEMO_REFRESH_TOKEN: &str = "demo-refresh-token";

/// Login/logout on top of the token store.
#[derive(Clone)]
pub struct SessionService {
    backend: Option<BackendClient>,
    tokens: Arc<dyn TokenStore>,
}

impl SessionService {
    /// `backend` is `None` in offline mode; only the demo account works then.
    pub fn new(backend: Option<BackendClient>, tokens: Arc<dyn TokenStore>) -> Self {
        Self { backend, tokens }
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated()
    }

    /// Log in and store the token pair. The member id doubles as session id.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, AppError> {
        if email == DEMO_EMAIL && password == DEMO_PASSWORD {
            self.tokens
                .store_session(DEMO_ACCESS_TOKEN, DEMO_REFRESH_TOKEN, Some(DEMO_USER_ID))?;
            tracing::info!(user_id = DEMO_USER_ID, "Demo login");
            return Ok(demo_user());
        }

        let backend = self.backend.as_ref().ok_or(AppError::Unauthorized)?;
        let response = backend.login(email, password).await?;

        self.tokens.store_session(
            &response.access_token,
            &response.refresh_token,
            Some(&response.user.id),
        )?;
        tracing::info!(user_id = %response.user.id, "Member logged in");
        Ok(response.user)
    }

    /// Log out. Stored tokens are cleared even if the backend call fails.
    pub async fn logout(&self) -> Result<(), AppError> {
        if let Some(backend) = &self.backend {
            if self.tokens.is_authenticated() {
                if let Err(e) = backend.logout().await {
                    tracing::warn!(error = %e, "Backend logout failed");
                }
            }
        }
        self.tokens.clear_session()?;
        tracing::info!("Session cleared");
        Ok(())
    }
}

fn demo_user() -> SessionUser {
    SessionUser {
        id: DEMO_USER_ID.to_string(),
        first_name: "Demo".to_string(),
        last_name: "User".to_string(),
        email: DEMO_EMAIL.to_string(),
    }
}
