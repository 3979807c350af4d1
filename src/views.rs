// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Read-only projections of the loaded analytics payload.
//!
//! Nothing here touches the network or the cache. Projections borrow the
//! payload, so recomputing them on every request is cheap.

use crate::models::{AnalyticsFilters, AnalyticsSummary, DisciplineStats, ScoreDataPoint, UserAnalytics};
use crate::time_utils::parse_date;
use serde::Serialize;

/// Score treated as 100% progress.
pub const MAX_SCORE: f64 = 100.0;
/// Average X count treated as 100% progress.
pub const MAX_X_COUNT: f64 = 10.0;
/// Number of matches treated as 100% progress.
pub const TARGET_MATCHES: f64 = 50.0;

/// Scores per averaging window in [`score_trends`].
const TREND_WINDOW: usize = 5;

/// Pass-through views over an optional payload.
#[derive(Debug, Clone, Copy)]
pub struct DerivedViews<'a> {
    analytics: Option<&'a UserAnalytics>,
}

impl<'a> DerivedViews<'a> {
    pub fn new(analytics: Option<&'a UserAnalytics>) -> Self {
        Self { analytics }
    }

    pub fn summary(&self) -> Option<&'a AnalyticsSummary> {
        self.analytics.and_then(|a| a.summary.as_ref())
    }

    pub fn score_history(&self) -> &'a [ScoreDataPoint] {
        self.analytics.map(|a| a.score_history.as_slice()).unwrap_or_default()
    }

    pub fn discipline_stats(&self) -> &'a [DisciplineStats] {
        self.analytics
            .map(|a| a.discipline_stats.as_slice())
            .unwrap_or_default()
    }

    /// Distinct discipline names from `discipline_stats`, first occurrence order.
    pub fn available_disciplines(&self) -> Vec<&'a str> {
        let mut names: Vec<&'a str> = Vec::new();
        for stats in self.discipline_stats() {
            if !names.contains(&stats.discipline.as_str()) {
                names.push(&stats.discipline);
            }
        }
        names
    }
}

/// Local post-filter of score history by discipline and explicit date range.
///
/// Bounds are inclusive. A point whose date (or a bound) does not parse is
/// dropped while a date range is active.
pub fn filter_score_history<'a>(
    points: &'a [ScoreDataPoint],
    filters: &AnalyticsFilters,
) -> Vec<&'a ScoreDataPoint> {
    let bounds = filters
        .date_range
        .as_ref()
        .map(|range| (parse_date(&range.start), parse_date(&range.end)));

    points
        .iter()
        .filter(|point| match &filters.discipline {
            Some(discipline) => &point.discipline == discipline,
            None => true,
        })
        .filter(|point| match bounds {
            None => true,
            Some((Some(start), Some(end))) => {
                parse_date(&point.date).is_some_and(|date| date >= start && date <= end)
            }
            Some(_) => false,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTrend {
    pub current_average: f64,
    pub previous_average: f64,
    /// Percent change from previous to current average
    pub improvement: f64,
    pub trend: TrendDirection,
}

/// Compare the mean of the latest five scores with the five before them.
///
/// Points are ordered by date first. Returns `None` for fewer than two points.
/// With no earlier window the previous average equals the current one.
pub fn score_trends(points: &[&ScoreDataPoint]) -> Option<ScoreTrend> {
    if points.len() < 2 {
        return None;
    }

    let mut sorted = points.to_vec();
    sorted.sort_by_key(|point| parse_date(&point.date));

    let split = sorted.len().saturating_sub(TREND_WINDOW);
    let (earlier, recent) = sorted.split_at(split);
    let previous = &earlier[earlier.len().saturating_sub(TREND_WINDOW)..];

    let current_average = mean(recent);
    let previous_average = if previous.is_empty() {
        current_average
    } else {
        mean(previous)
    };

    let improvement = if previous_average > 0.0 {
        (current_average - previous_average) / previous_average * 100.0
    } else {
        0.0
    };

    let trend = if improvement > 0.0 {
        TrendDirection::Up
    } else if improvement < 0.0 {
        TrendDirection::Down
    } else {
        TrendDirection::Stable
    };

    Some(ScoreTrend {
        current_average,
        previous_average,
        improvement,
        trend,
    })
}

fn mean(points: &[&ScoreDataPoint]) -> f64 {
    points.iter().map(|p| p.score).sum::<f64>() / points.len() as f64
}

/// Progress bars for one discipline, each in `0..=100`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisciplineProgress {
    pub score_progress: f64,
    pub x_count_progress: f64,
    pub matches_progress: f64,
}

pub fn discipline_progress(stats: &DisciplineStats) -> DisciplineProgress {
    DisciplineProgress {
        score_progress: percent_of(stats.average_score, MAX_SCORE),
        x_count_progress: percent_of(stats.average_x_count, MAX_X_COUNT),
        matches_progress: percent_of(f64::from(stats.total_matches), TARGET_MATCHES),
    }
}

fn percent_of(value: f64, max: f64) -> f64 {
    (value / max * 100.0).clamp(0.0, 100.0)
}

/// Score history as shown on the history page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreHistoryView<'a> {
    pub scores: Vec<&'a ScoreDataPoint>,
    pub trends: Option<ScoreTrend>,
}

impl<'a> ScoreHistoryView<'a> {
    pub fn new(views: DerivedViews<'a>, filters: &AnalyticsFilters) -> Self {
        let scores = filter_score_history(views.score_history(), filters);
        let trends = score_trends(&scores);
        Self { scores, trends }
    }
}

/// Discipline breakdown, optionally narrowed to one discipline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisciplineView<'a> {
    pub disciplines: Vec<&'a DisciplineStats>,
    pub progress: Option<DisciplineProgress>,
}

impl<'a> DisciplineView<'a> {
    /// With `discipline` set, only its stats (if present); otherwise all.
    /// Progress is for the first listed entry, so a selected discipline
    /// gets progress bars for itself rather than none.
    pub fn new(views: DerivedViews<'a>, discipline: Option<&str>) -> Self {
        let disciplines: Vec<&DisciplineStats> = views
            .discipline_stats()
            .iter()
            .filter(|stats| discipline.map_or(true, |d| stats.discipline == d))
            .take(if discipline.is_some() { 1 } else { usize::MAX })
            .collect();
        let progress = disciplines.first().map(|stats| discipline_progress(stats));
        Self {
            disciplines,
            progress,
        }
    }
}

/// Chart color for a discipline.
pub fn discipline_color(discipline: &str) -> &'static str {
    match discipline {
        "3P" => "#3B82F6",
        "Prone" => "#10B981",
        "Air Rifle" => "#F59E0B",
        "Air Pistol" => "#EF4444",
        _ => "#6B7280",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PerformanceLevel {
    pub level: &'static str,
    pub color: &'static str,
}

pub fn performance_level(score: f64) -> PerformanceLevel {
    let (level, color) = if score >= 95.0 {
        ("Excellent", "#10B981")
    } else if score >= 90.0 {
        ("Good", "#F59E0B")
    } else if score >= 85.0 {
        ("Average", "#3B82F6")
    } else {
        ("Needs Improvement", "#EF4444")
    };
    PerformanceLevel { level, color }
}

/// "Jan 15, 2024"; input that is not a date comes back unchanged.
pub fn format_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}
