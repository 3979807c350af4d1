// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use satrf_analytics::config::Config;
use satrf_analytics::error::AppError;
use satrf_analytics::routes::create_router;
use satrf_analytics::services::{
    synthetic, AnalyticsOptions, AnalyticsService, BackendClient, DataSource, DownloadSink,
    ExportFile, MemoryTokenStore, Monitoring, MonitoringConfig, TokenStore,
};
use satrf_analytics::AppState;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Path of the analytics endpoint as seen by the mock backend.
#[allow(dead_code)]
pub const ANALYTICS_PATH: &str = "/api/v1/users/dashboard/analytics";
#[allow(dead_code)]
pub const EXPORT_PATH: &str = "/api/v1/users/dashboard/export";
#[allow(dead_code)]
pub const REFRESH_PATH: &str = "/api/v1/users/refresh";
#[allow(dead_code)]
pub const LOGIN_PATH: &str = "/api/v1/users/login";

/// Create a test app in offline mode.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let monitoring = Monitoring::new(MonitoringConfig::default());
    monitoring.init();

    let state = Arc::new(
        AppState::build(
            Config::test_default(),
            Arc::new(MemoryTokenStore::new()),
            monitoring,
        )
        .expect("Failed to build test state"),
    );

    (create_router(state.clone()), state)
}

/// Token store holding a logged-in session.
#[allow(dead_code)]
pub fn logged_in_tokens() -> Arc<MemoryTokenStore> {
    let tokens = Arc::new(MemoryTokenStore::new());
    tokens
        .store_session("access-1", "refresh-1", Some("session-1"))
        .expect("store tokens");
    tokens
}

/// Backend client pointed at a mock server.
#[allow(dead_code)]
pub fn mock_backend(server_url: &str, tokens: Arc<dyn TokenStore>) -> BackendClient {
    BackendClient::new(
        format!("{}/api/v1", server_url),
        Duration::from_secs(5),
        tokens,
    )
    .expect("Failed to build backend client")
}

/// Analytics service backed by a mock server.
#[allow(dead_code)]
pub fn remote_service(
    server_url: &str,
    tokens: Arc<dyn TokenStore>,
    options: AnalyticsOptions,
) -> AnalyticsService {
    let monitoring = Monitoring::new(MonitoringConfig::default());
    monitoring.init();
    AnalyticsService::new(
        DataSource::Remote(mock_backend(server_url, tokens)),
        options,
        monitoring,
    )
}

/// Offline analytics service with no artificial delay.
#[allow(dead_code)]
pub fn offline_service(options: AnalyticsOptions) -> AnalyticsService {
    let monitoring = Monitoring::new(MonitoringConfig::default());
    monitoring.init();
    AnalyticsService::new(
        DataSource::Offline,
        AnalyticsOptions {
            synthetic_delay: Duration::ZERO,
            ..options
        },
        monitoring,
    )
}

/// A backend analytics payload (the example dataset as JSON).
#[allow(dead_code)]
pub fn analytics_body() -> String {
    serde_json::to_string(&synthetic::generate()).expect("serialize analytics")
}

/// Collects every delivered export.
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingSink {
    pub files: Mutex<Vec<ExportFile>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn delivered(&self) -> Vec<ExportFile> {
        self.files.lock().unwrap().clone()
    }
}

impl DownloadSink for RecordingSink {
    fn deliver(&self, file: &ExportFile) -> Result<(), AppError> {
        self.files.lock().unwrap().push(file.clone());
        Ok(())
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body")
}
