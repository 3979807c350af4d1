// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Analytics query filters.
//!
//! Filters are plain values: an update produces a new `AnalyticsFilters`
//! rather than mutating in place. No validation happens here; a malformed
//! date is passed to the backend (and to local filtering) as-is.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::iso_date;

/// Number of days covered by the default date range.
pub const DEFAULT_RANGE_DAYS: i64 = 90;

/// Aggregation period requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Period {
    Week,
    Month,
    Quarter,
    Year,
    All,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Week => "week",
            Period::Month => "month",
            Period::Quarter => "quarter",
            Period::Year => "year",
            Period::All => "all",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "quarter" => Ok(Period::Quarter),
            "year" => Ok(Period::Year),
            "all" => Ok(Period::All),
            _ => Err(format!("Unknown period: {}", s)),
        }
    }
}

/// Inclusive date range, kept as the caller supplied it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// The last [`DEFAULT_RANGE_DAYS`] days ending at `now`.
    pub fn trailing_days(now: DateTime<Utc>) -> Self {
        Self {
            start: iso_date(now - Duration::days(DEFAULT_RANGE_DAYS)),
            end: iso_date(now),
        }
    }

    /// Copy with one bound replaced.
    pub fn with_bound(&self, bound: RangeBound, value: impl Into<String>) -> Self {
        let mut range = self.clone();
        match bound {
            RangeBound::Start => range.start = value.into(),
            RangeBound::End => range.end = value.into(),
        }
        range
    }
}

/// Which end of a [`DateRange`] to update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeBound {
    Start,
    End,
}

/// Active analytics query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AnalyticsFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discipline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl AnalyticsFilters {
    /// Field-wise override: fields present in `update` win, the rest are kept.
    ///
    /// A supplied `date_range` replaces the whole range.
    pub fn merge(&self, update: &FiltersUpdate) -> Self {
        Self {
            date_range: pick(&self.date_range, &update.date_range),
            discipline: pick(&self.discipline, &update.discipline),
            period: pick(&self.period, &update.period),
            limit: pick(&self.limit, &update.limit),
        }
    }

    /// Query parameters for the analytics endpoint.
    pub fn fetch_query(&self, range: &DateRange) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("start_date", range.start.clone()),
            ("end_date", range.end.clone()),
        ];
        if let Some(discipline) = &self.discipline {
            query.push(("discipline", discipline.clone()));
        }
        if let Some(period) = self.period {
            query.push(("period", period.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        query
    }

    /// Query parameters for the export endpoint (no `limit`).
    pub fn export_query(&self, format: &str, range: &DateRange) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("format", format.to_string()),
            ("start_date", range.start.clone()),
            ("end_date", range.end.clone()),
        ];
        if let Some(discipline) = &self.discipline {
            query.push(("discipline", discipline.clone()));
        }
        if let Some(period) = self.period {
            query.push(("period", period.to_string()));
        }
        query
    }
}

fn pick<T: Clone>(current: &Option<T>, update: &Option<Option<T>>) -> Option<T> {
    match update {
        Some(value) => value.clone(),
        None => current.clone(),
    }
}

/// Partial filter update.
///
/// Outer `None`: keep the current value. `Some(None)`: clear it (JSON `null`).
/// `Some(Some(v))`: replace it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiltersUpdate {
    #[serde(default, deserialize_with = "present")]
    pub date_range: Option<Option<DateRange>>,
    #[serde(default, deserialize_with = "present")]
    pub discipline: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub period: Option<Option<Period>>,
    #[serde(default, deserialize_with = "present")]
    pub limit: Option<Option<u32>>,
}

impl FiltersUpdate {
    pub fn discipline(discipline: impl Into<String>) -> Self {
        Self {
            discipline: Some(Some(discipline.into())),
            ..Default::default()
        }
    }

    pub fn period(period: Period) -> Self {
        Self {
            period: Some(Some(period)),
            ..Default::default()
        }
    }

    pub fn date_range(range: DateRange) -> Self {
        Self {
            date_range: Some(Some(range)),
            ..Default::default()
        }
    }

    pub fn limit(limit: u32) -> Self {
        Self {
            limit: Some(Some(limit)),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.date_range.is_none()
            && self.discipline.is_none()
            && self.period.is_none()
            && self.limit.is_none()
    }
}

/// A field that appears in the JSON (even as `null`) is `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
