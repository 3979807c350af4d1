// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes: login, logout and status.

use crate::error::{AppError, Result};
use crate::models::{LoginRequest, SessionUser};
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/session",
        get(get_session).post(login).delete(logout),
    )
}

#[derive(Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
}

async fn get_session(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    Json(SessionStatus {
        authenticated: state.session.is_authenticated(),
    })
}

#[derive(Serialize)]
pub struct LoginResult {
    pub user: SessionUser,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResult>> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let user = state.session.login(body.email.trim(), &body.password).await?;
    state.monitoring.set_user(Some(user.id.clone()));
    Ok(Json(LoginResult { user }))
}

async fn logout(State(state): State<Arc<AppState>>) -> Result<StatusCode> {
    state.session.logout().await?;
    state.analytics.cache().invalidate_all();
    state.monitoring.set_user(None);
    Ok(StatusCode::NO_CONTENT)
}
