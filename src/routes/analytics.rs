// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Analytics routes used by the member dashboard.

use crate::error::{AppError, Result};
use crate::models::{
    AnalyticsFilters, AnalyticsSummary, DateRange, DisciplineStats, FiltersUpdate, RangeBound,
    ScoreDataPoint, UserAnalytics,
};
use crate::services::{AnalyticsSnapshot, DownloadSink, ExportFile, ExportFormat, LoadOutcome};
use crate::time_utils::format_utc_rfc3339;
use crate::views::{
    discipline_color, format_date, performance_level, DisciplineProgress, DisciplineView,
    PerformanceLevel, ScoreHistoryView, ScoreTrend,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/analytics", get(get_snapshot))
        .route("/api/analytics/load", post(load))
        .route("/api/analytics/refresh", post(refresh))
        .route("/api/analytics/filters", patch(update_filters))
        .route("/api/analytics/date-range/{bound}", put(update_date_range))
        .route("/api/analytics/score-history", get(get_score_history))
        .route("/api/analytics/disciplines", get(get_disciplines))
        .route("/api/analytics/export", get(export))
}

// ─── Snapshot ────────────────────────────────────────────────

/// Dashboard state plus the pass-through projections.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResponse<'a> {
    pub analytics: Option<&'a UserAnalytics>,
    pub summary: Option<&'a AnalyticsSummary>,
    pub available_disciplines: Vec<&'a str>,
    pub loading: bool,
    pub error: Option<&'a str>,
    pub filters: &'a AnalyticsFilters,
    pub date_range: &'a DateRange,
    pub last_fetch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<LoadOutcome>,
}

fn snapshot_response(snapshot: &AnalyticsSnapshot, outcome: Option<LoadOutcome>) -> Response {
    let views = snapshot.views();
    Json(SnapshotResponse {
        analytics: snapshot.analytics.as_deref(),
        summary: views.summary(),
        available_disciplines: views.available_disciplines(),
        loading: snapshot.loading,
        error: snapshot.error.as_deref(),
        filters: &snapshot.filters,
        date_range: &snapshot.date_range,
        last_fetch: snapshot.last_fetch.map(format_utc_rfc3339),
        outcome,
    })
    .into_response()
}

async fn get_snapshot(State(state): State<Arc<AppState>>) -> Response {
    snapshot_response(&state.analytics.snapshot().await, None)
}

async fn load(State(state): State<Arc<AppState>>) -> Response {
    let outcome = state.analytics.load_analytics().await;
    snapshot_response(&state.analytics.snapshot().await, Some(outcome))
}

async fn refresh(State(state): State<Arc<AppState>>) -> Response {
    let outcome = state.analytics.refresh_data().await;
    snapshot_response(&state.analytics.snapshot().await, Some(outcome))
}

// ─── Filters ─────────────────────────────────────────────────

async fn update_filters(
    State(state): State<Arc<AppState>>,
    Json(update): Json<FiltersUpdate>,
) -> Response {
    let outcome = state.analytics.apply_filters(&update).await;
    snapshot_response(&state.analytics.snapshot().await, Some(outcome))
}

#[derive(Deserialize)]
pub struct DateBoundRequest {
    pub value: String,
}

async fn update_date_range(
    State(state): State<Arc<AppState>>,
    Path(bound): Path<RangeBound>,
    Json(body): Json<DateBoundRequest>,
) -> Result<Response> {
    if body.value.trim().is_empty() {
        return Err(AppError::BadRequest("Date value is required".to_string()));
    }

    state.analytics.update_date_range(bound, &body.value).await;
    let outcome = state.analytics.load_analytics().await;
    Ok(snapshot_response(
        &state.analytics.snapshot().await,
        Some(outcome),
    ))
}

// ─── Score History ───────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry<'a> {
    #[serde(flatten)]
    pub point: &'a ScoreDataPoint,
    pub display_date: String,
    pub performance: PerformanceLevel,
}

#[derive(Serialize)]
pub struct ScoreHistoryResponse<'a> {
    pub scores: Vec<ScoreEntry<'a>>,
    pub trends: Option<ScoreTrend>,
}

async fn get_score_history(State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state.analytics.snapshot().await;
    let view = ScoreHistoryView::new(snapshot.views(), &snapshot.filters);

    let scores = view
        .scores
        .into_iter()
        .map(|point| ScoreEntry {
            point,
            display_date: format_date(&point.date),
            performance: performance_level(point.score),
        })
        .collect();

    Json(ScoreHistoryResponse {
        scores,
        trends: view.trends,
    })
    .into_response()
}

// ─── Disciplines ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DisciplineQuery {
    pub discipline: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisciplineEntry<'a> {
    #[serde(flatten)]
    pub stats: &'a DisciplineStats,
    pub color: &'static str,
    pub performance: PerformanceLevel,
}

#[derive(Serialize)]
pub struct DisciplineResponse<'a> {
    pub disciplines: Vec<DisciplineEntry<'a>>,
    pub progress: Option<DisciplineProgress>,
}

/// Discipline breakdown; `?discipline=` overrides the filter's discipline.
async fn get_disciplines(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DisciplineQuery>,
) -> Response {
    let snapshot = state.analytics.snapshot().await;
    let selected = query
        .discipline
        .as_deref()
        .or(snapshot.filters.discipline.as_deref());
    let view = DisciplineView::new(snapshot.views(), selected);

    let disciplines = view
        .disciplines
        .into_iter()
        .map(|stats| DisciplineEntry {
            stats,
            color: discipline_color(&stats.discipline),
            performance: performance_level(stats.average_score),
        })
        .collect();

    Json(DisciplineResponse {
        disciplines,
        progress: view.progress,
    })
    .into_response()
}

// ─── Export ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ExportQuery {
    pub format: String,
}

/// Holds the delivered file until it is written into the response.
#[derive(Default)]
struct AttachmentSink {
    file: Mutex<Option<ExportFile>>,
}

impl AttachmentSink {
    fn take(&self) -> Option<ExportFile> {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl DownloadSink for AttachmentSink {
    fn deliver(&self, file: &ExportFile) -> Result<()> {
        *self.file.lock().unwrap_or_else(PoisonError::into_inner) = Some(file.clone());
        Ok(())
    }
}

async fn export(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> Result<Response> {
    let format: ExportFormat = query.format.parse()?;

    let sink = AttachmentSink::default();
    state.analytics.export_data(format, &sink).await?;
    let file = sink
        .take()
        .ok_or_else(|| AppError::Export("export was not delivered".to_string()))?;

    let disposition = format!("attachment; filename=\"{}\"", file.filename);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}
