// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SATRF analytics: fetch, cache, derive and export a member's competition
//! analytics.
//!
//! This crate provides the analytics pipeline used by the member dashboard
//! and a small HTTP service exposing it to the dashboard frontend.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod views;

use config::Config;
use error::AppError;
use services::{
    AnalyticsOptions, AnalyticsService, BackendClient, DataSource, Monitoring, SessionService,
    TokenStore,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub analytics: AnalyticsService,
    pub session: SessionService,
    pub monitoring: Monitoring,
}

impl AppState {
    /// Wire the services for `config`. No backend client is built in offline mode.
    pub fn build(
        config: Config,
        tokens: Arc<dyn TokenStore>,
        monitoring: Monitoring,
    ) -> Result<Self, AppError> {
        let backend = match config.api_url() {
            Some(api_url) => Some(BackendClient::new(
                api_url,
                config.request_timeout,
                tokens.clone(),
            )?),
            None => None,
        };

        let source = match &backend {
            Some(client) => DataSource::Remote(client.clone()),
            None => DataSource::Offline,
        };

        monitoring.set_user(config.user_id.clone());
        let analytics = AnalyticsService::new(
            source,
            AnalyticsOptions::from_config(&config),
            monitoring.clone(),
        );
        let session = SessionService::new(backend, tokens);

        Ok(Self {
            config,
            analytics,
            session,
            monitoring,
        })
    }
}
