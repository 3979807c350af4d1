// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Analytics pipeline: filters, cache, fetch, export and auto-refresh.
//!
//! One `AnalyticsService` plays the role of one mounted dashboard. It keeps
//! the view state (current payload, loading flag, error message, filters)
//! and resolves the active filters through the cache, the backend, or the
//! synthetic generator.
//!
//! Overlapping loads are allowed. Each load takes a sequence number and only
//! the most recently started load may commit, to the view state or to the
//! cache.

use crate::config::Config;
use crate::error::{AppError, LOAD_FAILURE_MESSAGE};
use crate::models::{AnalyticsFilters, DateRange, FiltersUpdate, RangeBound, UserAnalytics};
use crate::services::backend::BackendClient;
use crate::services::cache::{AnalyticsCache, DEFAULT_CACHE_TIMEOUT};
use crate::services::export::{self, DownloadSink, ExportFile, ExportFormat};
use crate::services::monitoring::{EventKind, Monitoring};
use crate::services::synthetic;
use crate::views::DerivedViews;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default auto-refresh period (5 minutes).
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Default artificial latency of the offline generator.
pub const DEFAULT_SYNTHETIC_DELAY: Duration = Duration::from_secs(1);

/// Shortest auto-refresh period accepted.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Where analytics come from on a cache miss.
#[derive(Clone)]
pub enum DataSource {
    Remote(BackendClient),
    /// No backend configured: serve the synthetic dataset.
    Offline,
}

/// Pipeline options.
#[derive(Debug, Clone)]
pub struct AnalyticsOptions {
    pub user_id: Option<String>,
    pub initial_filters: AnalyticsFilters,
    pub enable_caching: bool,
    pub cache_timeout: Duration,
    pub auto_refresh: bool,
    pub refresh_interval: Duration,
    /// Fall back to synthetic data when a load fails
    pub development: bool,
    pub synthetic_delay: Duration,
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        Self {
            user_id: None,
            initial_filters: AnalyticsFilters::default(),
            enable_caching: true,
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
            auto_refresh: false,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            development: false,
            synthetic_delay: DEFAULT_SYNTHETIC_DELAY,
        }
    }
}

impl AnalyticsOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            user_id: config.user_id.clone(),
            initial_filters: AnalyticsFilters::default(),
            enable_caching: config.enable_caching,
            cache_timeout: config.cache_timeout,
            auto_refresh: config.auto_refresh,
            refresh_interval: config.refresh_interval,
            development: config.environment.is_development(),
            synthetic_delay: config.synthetic_delay,
        }
    }
}

/// How a call to [`AnalyticsService::load_analytics`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Served from a valid cache entry; no backend call.
    CacheHit,
    /// Resolved by the backend (or generator) and committed.
    Fetched,
    /// Resolution failed; the error message is set.
    Failed,
    /// A newer load started meanwhile; nothing was committed.
    Superseded,
}

/// Point-in-time copy of the view state.
#[derive(Debug, Clone)]
pub struct AnalyticsSnapshot {
    pub analytics: Option<Arc<UserAnalytics>>,
    pub loading: bool,
    pub error: Option<String>,
    pub filters: AnalyticsFilters,
    /// Date range actually sent to the backend
    pub date_range: DateRange,
    pub last_fetch: Option<DateTime<Utc>>,
}

impl AnalyticsSnapshot {
    pub fn views(&self) -> DerivedViews<'_> {
        DerivedViews::new(self.analytics.as_deref())
    }
}

#[derive(Debug, Default)]
struct ViewState {
    analytics: Option<Arc<UserAnalytics>>,
    loading: bool,
    error: Option<String>,
    filters: AnalyticsFilters,
    last_fetch: Option<DateTime<Utc>>,
}

struct Inner {
    source: DataSource,
    cache: AnalyticsCache,
    state: RwLock<ViewState>,
    default_range: DateRange,
    user_id: Option<String>,
    development: bool,
    auto_refresh: bool,
    refresh_interval: Duration,
    synthetic_delay: Duration,
    /// Number of the most recently started load
    sequence: AtomicU64,
    /// Cache misses resolved by the backend or generator
    backend_fetches: AtomicU64,
    monitoring: Monitoring,
}

/// Shared analytics pipeline handle.
#[derive(Clone)]
pub struct AnalyticsService {
    inner: Arc<Inner>,
}

impl AnalyticsService {
    pub fn new(source: DataSource, options: AnalyticsOptions, monitoring: Monitoring) -> Self {
        let state = ViewState {
            filters: options.initial_filters,
            ..Default::default()
        };

        Self {
            inner: Arc::new(Inner {
                source,
                cache: AnalyticsCache::new(options.enable_caching, options.cache_timeout),
                state: RwLock::new(state),
                default_range: DateRange::trailing_days(Utc::now()),
                user_id: options.user_id,
                development: options.development,
                auto_refresh: options.auto_refresh,
                refresh_interval: options.refresh_interval,
                synthetic_delay: options.synthetic_delay,
                sequence: AtomicU64::new(0),
                backend_fetches: AtomicU64::new(0),
                monitoring,
            }),
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self.inner.source, DataSource::Offline)
    }

    pub fn cache(&self) -> &AnalyticsCache {
        &self.inner.cache
    }

    pub fn monitoring(&self) -> &Monitoring {
        &self.inner.monitoring
    }

    /// Number of loads that went past the cache.
    pub fn backend_fetches(&self) -> u64 {
        self.inner.backend_fetches.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> AnalyticsSnapshot {
        let state = self.inner.state.read().await;
        AnalyticsSnapshot {
            analytics: state.analytics.clone(),
            loading: state.loading,
            error: state.error.clone(),
            filters: state.filters.clone(),
            date_range: self.effective_range(&state.filters),
            last_fetch: state.last_fetch,
        }
    }

    pub async fn filters(&self) -> AnalyticsFilters {
        self.inner.state.read().await.filters.clone()
    }

    // ─── Filter Model ────────────────────────────────────────────────────────

    /// Merge a partial update into the filters. Does not load.
    pub async fn update_filters(&self, update: &FiltersUpdate) -> AnalyticsFilters {
        let mut state = self.inner.state.write().await;
        state.filters = state.filters.merge(update);
        tracing::debug!(filters = ?state.filters, "Filters updated");
        state.filters.clone()
    }

    /// Merge a partial update and reload, as a filter change in the UI would.
    pub async fn apply_filters(&self, update: &FiltersUpdate) -> LoadOutcome {
        self.update_filters(update).await;
        self.load_analytics().await
    }

    /// Replace one bound of the effective date range. Does not load.
    ///
    /// The range is stored as `filters.date_range`, so from then on it also
    /// narrows score history locally and is part of the cache key.
    pub async fn update_date_range(&self, bound: RangeBound, value: &str) -> DateRange {
        let mut state = self.inner.state.write().await;
        let range = self.effective_range(&state.filters).with_bound(bound, value);
        state.filters.date_range = Some(range.clone());
        range
    }

    fn effective_range(&self, filters: &AnalyticsFilters) -> DateRange {
        filters
            .date_range
            .clone()
            .unwrap_or_else(|| self.inner.default_range.clone())
    }

    // ─── Fetch ───────────────────────────────────────────────────────────────

    /// Resolve the current filters into the view state.
    ///
    /// Never fails: errors end up in the view state's error message.
    pub async fn load_analytics(&self) -> LoadOutcome {
        let seq = self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;

        let (filters, range) = {
            let mut state = self.inner.state.write().await;
            state.loading = true;
            state.error = None;
            (state.filters.clone(), self.effective_range(&state.filters))
        };

        let key = AnalyticsCache::key(self.inner.user_id.as_deref(), &filters, &range);

        if let Some(entry) = self.inner.cache.get_valid(&key) {
            tracing::debug!(key = %key, "Analytics cache hit");
            let committed = self
                .commit(seq, |state| {
                    state.analytics = Some(entry.data);
                    state.last_fetch = Some(entry.timestamp);
                })
                .await;
            return if committed {
                LoadOutcome::CacheHit
            } else {
                LoadOutcome::Superseded
            };
        }

        let started = Instant::now();
        let result = self.fetch(&filters, &range).await;
        self.inner
            .monitoring
            .track_load(started.elapsed(), result.is_ok());

        match result {
            Ok(data) => {
                let data = Arc::new(data);
                let cache = &self.inner.cache;

                let committed = self
                    .commit(seq, |state| {
                        cache.put(key, data.clone());
                        state.analytics = Some(data);
                        state.last_fetch = Some(Utc::now());
                        state.error = None;
                    })
                    .await;

                if committed {
                    tracing::info!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Analytics loaded"
                    );
                    LoadOutcome::Fetched
                } else {
                    LoadOutcome::Superseded
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Error loading analytics");
                self.inner.monitoring.track_error("analytics_load", &e);

                let fallback = self
                    .inner
                    .development
                    .then(|| Arc::new(synthetic::generate()));

                let committed = self
                    .commit(seq, |state| {
                        state.error = Some(LOAD_FAILURE_MESSAGE.to_string());
                        if let Some(data) = fallback {
                            state.analytics = Some(data);
                            state.last_fetch = Some(Utc::now());
                        }
                    })
                    .await;

                if committed {
                    LoadOutcome::Failed
                } else {
                    LoadOutcome::Superseded
                }
            }
        }
    }

    /// Drop the whole cache, then load.
    pub async fn refresh_data(&self) -> LoadOutcome {
        self.inner.cache.invalidate_all();
        tracing::debug!("Analytics cache cleared for refresh");
        self.load_analytics().await
    }

    async fn fetch(
        &self,
        filters: &AnalyticsFilters,
        range: &DateRange,
    ) -> Result<UserAnalytics, AppError> {
        self.inner.backend_fetches.fetch_add(1, Ordering::SeqCst);

        match &self.inner.source {
            DataSource::Offline => {
                tokio::time::sleep(self.inner.synthetic_delay).await;
                Ok(synthetic::generate())
            }
            DataSource::Remote(client) => client.get_analytics(&filters.fetch_query(range)).await,
        }
    }

    /// Apply `update` and clear the loading flag, unless a newer load started.
    async fn commit<F>(&self, seq: u64, update: F) -> bool
    where
        F: FnOnce(&mut ViewState),
    {
        let mut state = self.inner.state.write().await;
        if self.inner.sequence.load(Ordering::SeqCst) != seq {
            tracing::debug!(seq, "Discarding stale analytics result");
            return false;
        }
        update(&mut state);
        state.loading = false;
        true
    }

    // ─── Export ──────────────────────────────────────────────────────────────

    /// Export the current filtered view and hand it to `sink`.
    ///
    /// Any failure is logged and returned as [`AppError::Export`]; there is no retry.
    pub async fn export_data(
        &self,
        format: ExportFormat,
        sink: &dyn DownloadSink,
    ) -> Result<ExportFile, AppError> {
        let (filters, range) = {
            let state = self.inner.state.read().await;
            (state.filters.clone(), self.effective_range(&state.filters))
        };

        let bytes = match &self.inner.source {
            DataSource::Remote(client) => {
                client
                    .export_analytics(&filters.export_query(format.as_str(), &range))
                    .await
            }
            DataSource::Offline => export::render_offline(format, &synthetic::generate()),
        }
        .map_err(|e| self.export_failure(format, e))?;

        let file = ExportFile::new(format, bytes, Utc::now());
        sink.deliver(&file)
            .map_err(|e| self.export_failure(format, e))?;

        self.inner.monitoring.track_event(
            EventKind::UserAction,
            "analytics_export",
            serde_json::json!({ "format": format.as_str(), "bytes": file.bytes.len() }),
        );
        tracing::info!(filename = %file.filename, bytes = file.bytes.len(), "Analytics exported");
        Ok(file)
    }

    fn export_failure(&self, format: ExportFormat, error: AppError) -> AppError {
        tracing::error!(error = %error, format = %format, "Error exporting analytics");
        self.inner.monitoring.track_error("analytics_export", &error);
        let cause = match error.export_cause() {
            Some(cause) => cause.to_string(),
            None => error.to_string(),
        };
        AppError::Export(cause)
    }

    // ─── Auto-refresh ────────────────────────────────────────────────────────

    /// Start periodic reloads if enabled. The first reload happens one
    /// interval from now. Reloads stop when the handle is dropped.
    pub fn start_auto_refresh(&self) -> Option<AutoRefreshHandle> {
        if !self.inner.auto_refresh {
            return None;
        }

        let period = self.inner.refresh_interval.max(MIN_REFRESH_INTERVAL);
        let service = self.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tracing::debug!("Auto-refresh tick");
                service.load_analytics().await;
            }
        });

        tracing::info!(interval_secs = period.as_secs(), "Auto-refresh started");
        Some(AutoRefreshHandle { task })
    }
}

/// Running auto-refresh timer. Dropping it cancels the timer.
pub struct AutoRefreshHandle {
    task: JoinHandle<()>,
}

impl AutoRefreshHandle {
    pub fn stop(self) {
        drop(self);
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for AutoRefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
        tracing::debug!("Auto-refresh stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::monitoring::MonitoringConfig;

    fn offline_service(options: AnalyticsOptions) -> AnalyticsService {
        AnalyticsService::new(
            DataSource::Offline,
            AnalyticsOptions {
                synthetic_delay: Duration::ZERO,
                ..options
            },
            Monitoring::new(MonitoringConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_initial_state_is_idle() {
        let service = offline_service(AnalyticsOptions::default());
        let snapshot = service.snapshot().await;

        assert!(snapshot.analytics.is_none());
        assert!(!snapshot.loading);
        assert!(snapshot.error.is_none());
        assert!(snapshot.views().summary().is_none());
    }

    #[tokio::test]
    async fn test_default_range_used_until_set() {
        let service = offline_service(AnalyticsOptions::default());
        let default_range = service.snapshot().await.date_range;

        let range = service.update_date_range(RangeBound::End, "2024-06-30").await;
        assert_eq!(range.start, default_range.start);
        assert_eq!(range.end, "2024-06-30");
        assert_eq!(service.filters().await.date_range, Some(range));
    }

    #[tokio::test]
    async fn test_stale_commit_is_discarded() {
        let service = offline_service(AnalyticsOptions::default());

        // Simulate a newer load having started after seq 1
        service.inner.sequence.store(2, Ordering::SeqCst);
        let committed = service
            .commit(1, |state| state.error = Some("stale".to_string()))
            .await;

        assert!(!committed);
        assert!(service.snapshot().await.error.is_none());
    }

    #[tokio::test]
    async fn test_stale_fetch_does_not_touch_cache() {
        let service = offline_service(AnalyticsOptions::default());
        let key = "k".to_string();

        service.inner.sequence.store(2, Ordering::SeqCst);
        let cache = &service.inner.cache;
        let committed = service
            .commit(1, |_| {
                cache.put(key.clone(), Arc::new(UserAnalytics::default()));
            })
            .await;

        assert!(!committed);
        assert!(service.cache().is_empty());
    }

    #[tokio::test]
    async fn test_auto_refresh_disabled_by_default() {
        let service = offline_service(AnalyticsOptions::default());
        assert!(service.start_auto_refresh().is_none());
    }
}
