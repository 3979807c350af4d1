// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Analytics payload returned by `GET /users/dashboard/analytics`.
//!
//! The backend is loose about missing data: any collection may be absent or
//! `null`, and so may most scalar fields. Those are defaulted here, at the
//! deserialization boundary, so derived views never see a null.

use serde::{Deserialize, Deserializer, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Treat an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Accept any JSON number as a count. Fractions truncate, negatives become
/// zero and values past `u32::MAX` saturate.
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_optional_count(deserializer).map(Option::unwrap_or_default)
}

fn lenient_optional_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    // Float to int `as` casts saturate and map NaN to zero.
    Ok(Option::<f64>::deserialize(deserializer)?.map(|n| n as u32))
}

/// One historical competition result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ScoreDataPoint {
    /// Competition date (`YYYY-MM-DD` or RFC3339)
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub x_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub discipline: String,
    #[serde(
        default,
        deserialize_with = "lenient_optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub position: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_participants: Option<u32>,
}

/// Per-discipline aggregate, computed by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DisciplineStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub discipline: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_matches: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub average_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub personal_best: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_x_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub average_x_count: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_score_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_score_event: Option<String>,
}

/// Aggregate over one period (week, month, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PerformanceTrend {
    #[serde(default, deserialize_with = "null_as_default")]
    pub period: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub average_score: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_matches: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_x_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub improvement: f64,
}

/// An event the member entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EventParticipation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub discipline: String,
    /// `upcoming`, `completed`, `cancelled`, ...
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub x_count: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub position: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_participants: Option<u32>,
}

/// Headline figures for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AnalyticsSummary {
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_matches: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub average_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub personal_best: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_x_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub average_x_count: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub improvement_rate: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub consistency_score: f64,
}

/// Aggregate root of one analytics response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserAnalytics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub score_history: Vec<ScoreDataPoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub discipline_stats: Vec<DisciplineStats>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub performance_trends: Vec<PerformanceTrend>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_participation: Vec<EventParticipation>,
    #[serde(default)]
    pub summary: Option<AnalyticsSummary>,
}
