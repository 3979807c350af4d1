// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard monitoring: event log, load timings, alerts and health.
//!
//! One instance is built at startup and handed to whoever needs it. Events
//! are only recorded between `init()` and `shutdown()`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Monitoring thresholds.
#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    /// Loads slower than this raise a performance alert
    pub slow_load_threshold: Duration,
    /// Error fraction above which the service reports degraded
    pub error_rate_threshold: f64,
    /// Size of the in-memory event ring
    pub max_stored_events: usize,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            slow_load_threshold: Duration::from_secs(5),
            error_rate_threshold: 0.05,
            max_stored_events: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Error,
    Performance,
    UserAction,
    System,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringEvent {
    pub kind: EventKind,
    pub name: String,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub uptime_secs: u64,
    pub error_rate: f64,
    pub message: String,
}

struct MonitoringInner {
    config: MonitoringConfig,
    running: AtomicBool,
    started_at: Mutex<Option<Instant>>,
    events: Mutex<VecDeque<MonitoringEvent>>,
    user_id: Mutex<Option<String>>,
    loads: AtomicU64,
    failures: AtomicU64,
}

/// Shared monitoring handle.
#[derive(Clone)]
pub struct Monitoring {
    inner: Arc<MonitoringInner>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Monitoring {
    pub fn new(config: MonitoringConfig) -> Self {
        Self {
            inner: Arc::new(MonitoringInner {
                config,
                running: AtomicBool::new(false),
                started_at: Mutex::new(None),
                events: Mutex::new(VecDeque::new()),
                user_id: Mutex::new(None),
                loads: AtomicU64::new(0),
                failures: AtomicU64::new(0),
            }),
        }
    }

    /// Start recording.
    pub fn init(&self) {
        if self.inner.running.swap(true, Ordering::SeqCst) {
            return;
        }
        *lock(&self.inner.started_at) = Some(Instant::now());
        tracing::info!("Monitoring started");
    }

    /// Stop recording and log a summary.
    pub fn shutdown(&self) {
        if !self.inner.running.swap(false, Ordering::SeqCst) {
            return;
        }
        tracing::info!(
            loads = self.inner.loads.load(Ordering::Relaxed),
            failures = self.inner.failures.load(Ordering::Relaxed),
            events = lock(&self.inner.events).len(),
            "Monitoring stopped"
        );
        *lock(&self.inner.started_at) = None;
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    pub fn set_user(&self, user_id: Option<String>) {
        *lock(&self.inner.user_id) = user_id;
    }

    /// Record an event. Dropped when monitoring is not running.
    pub fn track_event(&self, kind: EventKind, name: impl Into<String>, data: serde_json::Value) {
        if !self.is_running() {
            return;
        }

        let event = MonitoringEvent {
            kind,
            name: name.into(),
            data,
            timestamp: Utc::now(),
            user_id: lock(&self.inner.user_id).clone(),
        };
        tracing::debug!(kind = ?event.kind, name = %event.name, "Monitoring event");

        let mut events = lock(&self.inner.events);
        events.push_back(event);
        while events.len() > self.inner.config.max_stored_events {
            events.pop_front();
        }
    }

    pub fn track_error(&self, context: &str, error: &dyn std::error::Error) {
        self.track_event(
            EventKind::Error,
            "application_error",
            serde_json::json!({ "context": context, "message": error.to_string() }),
        );
    }

    /// Record one analytics resolution (backend or generator).
    pub fn track_load(&self, elapsed: Duration, ok: bool) {
        self.inner.loads.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.inner.failures.fetch_add(1, Ordering::Relaxed);
        }

        let elapsed_ms = elapsed.as_millis() as u64;
        self.track_event(
            EventKind::Performance,
            "analytics_load",
            serde_json::json!({ "elapsedMs": elapsed_ms, "ok": ok }),
        );

        if elapsed > self.inner.config.slow_load_threshold {
            tracing::warn!(elapsed_ms, "Slow analytics load");
            self.track_event(
                EventKind::System,
                "performance_alert_slow_load",
                serde_json::json!({
                    "elapsedMs": elapsed_ms,
                    "thresholdMs": self.inner.config.slow_load_threshold.as_millis() as u64,
                }),
            );
        }
    }

    /// Fraction of tracked loads that failed.
    pub fn error_rate(&self) -> f64 {
        let loads = self.inner.loads.load(Ordering::Relaxed);
        if loads == 0 {
            return 0.0;
        }
        self.inner.failures.load(Ordering::Relaxed) as f64 / loads as f64
    }

    /// Evaluate alert thresholds; each raised alert is logged and recorded.
    pub fn check_alert_conditions(&self) -> Vec<Alert> {
        let mut alerts = Vec::new();
        let error_rate = self.error_rate();
        let threshold = self.inner.config.error_rate_threshold;

        if error_rate > threshold {
            alerts.push(Alert {
                level: AlertLevel::Critical,
                title: "High Error Rate Detected".to_string(),
                message: format!(
                    "Error rate is {:.2}%, exceeding threshold of {:.2}%",
                    error_rate * 100.0,
                    threshold * 100.0
                ),
            });
        }

        for alert in &alerts {
            tracing::error!(level = ?alert.level, title = %alert.title, "{}", alert.message);
            self.track_event(
                EventKind::System,
                "alert",
                serde_json::json!({ "level": alert.level, "title": alert.title }),
            );
        }
        alerts
    }

    pub fn health(&self) -> HealthReport {
        let started_at = *lock(&self.inner.started_at);
        let uptime_secs = started_at.map(|t| t.elapsed().as_secs()).unwrap_or(0);
        let error_rate = self.error_rate();

        let (status, message) = if !self.is_running() {
            (HealthStatus::Unhealthy, "Monitoring not running")
        } else if error_rate > self.inner.config.error_rate_threshold {
            (HealthStatus::Degraded, "Analytics error rate above threshold")
        } else {
            (HealthStatus::Healthy, "All systems operational")
        };

        HealthReport {
            status,
            uptime_secs,
            error_rate,
            message: message.to_string(),
        }
    }

    pub fn stored_events(&self) -> Vec<MonitoringEvent> {
        lock(&self.inner.events).iter().cloned().collect()
    }

    pub fn clear_stored_events(&self) {
        lock(&self.inner.events).clear();
    }
}
