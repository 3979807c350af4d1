// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod analytics;
pub mod backend;
pub mod cache;
pub mod export;
pub mod monitoring;
pub mod session;
pub mod synthetic;
pub mod token_store;

pub use analytics::{
    AnalyticsOptions, AnalyticsService, AnalyticsSnapshot, AutoRefreshHandle, DataSource,
    LoadOutcome,
};
pub use backend::BackendClient;
pub use cache::{AnalyticsCache, CacheEntry};
pub use export::{DownloadSink, ExportFile, ExportFormat};
pub use monitoring::{Monitoring, MonitoringConfig};
pub use session::SessionService;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
