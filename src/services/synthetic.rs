// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fixed example dataset used when no backend is configured.
//!
//! The generator ignores filters; the dataset is the same every time.

use crate::models::{
    AnalyticsSummary, DisciplineStats, EventParticipation, PerformanceTrend, ScoreDataPoint,
    UserAnalytics,
};

fn score(
    date: &str,
    score: f64,
    x_count: u32,
    event_name: &str,
    discipline: &str,
    position: u32,
    total_participants: u32,
) -> ScoreDataPoint {
    ScoreDataPoint {
        date: date.to_string(),
        score,
        x_count,
        event_name: event_name.to_string(),
        discipline: discipline.to_string(),
        position: Some(position),
        total_participants: Some(total_participants),
    }
}

#[allow(clippy::too_many_arguments)]
fn discipline(
    name: &str,
    total_matches: u32,
    average_score: f64,
    personal_best: f64,
    total_x_count: u32,
    average_x_count: f64,
    best_score_date: &str,
    best_score_event: &str,
) -> DisciplineStats {
    DisciplineStats {
        discipline: name.to_string(),
        total_matches,
        average_score,
        personal_best,
        total_x_count,
        average_x_count,
        best_score_date: Some(best_score_date.to_string()),
        best_score_event: Some(best_score_event.to_string()),
    }
}

fn trend(
    period: &str,
    average_score: f64,
    total_matches: u32,
    total_x_count: u32,
    improvement: f64,
) -> PerformanceTrend {
    PerformanceTrend {
        period: period.to_string(),
        average_score,
        total_matches,
        total_x_count,
        improvement,
    }
}

/// Build the synthetic analytics payload.
pub fn generate() -> UserAnalytics {
    UserAnalytics {
        score_history: vec![
            score("2024-01-15", 95.0, 8, "SATRF Championship", "3P", 3, 25),
            score("2024-02-10", 92.0, 6, "Club Competition", "Prone", 5, 15),
            score("2024-03-05", 98.0, 12, "Regional Match", "3P", 1, 30),
            score("2024-04-12", 96.0, 10, "National Qualifier", "Prone", 2, 40),
        ],
        discipline_stats: vec![
            discipline(
                "3P",
                8,
                91.5,
                98.0,
                45,
                5.6,
                "2024-03-05",
                "Regional Match",
            ),
            discipline(
                "Prone",
                6,
                93.2,
                96.0,
                38,
                6.3,
                "2024-04-12",
                "National Qualifier",
            ),
            discipline(
                "Air Rifle",
                4,
                89.8,
                94.0,
                22,
                5.5,
                "2024-02-20",
                "Air Rifle Championship",
            ),
        ],
        performance_trends: vec![
            trend("week", 92.5, 2, 12, 2.1),
            trend("month", 91.8, 8, 45, 1.5),
            trend("quarter", 90.2, 18, 105, 3.2),
        ],
        event_participation: vec![
            EventParticipation {
                event_id: "1".to_string(),
                event_name: "SATRF Championship".to_string(),
                date: "2024-01-15".to_string(),
                location: "Johannesburg".to_string(),
                discipline: "3P".to_string(),
                status: "completed".to_string(),
                score: Some(95.0),
                x_count: Some(8),
                position: Some(3),
                total_participants: Some(25),
            },
            EventParticipation {
                event_id: "2".to_string(),
                event_name: "Club Competition".to_string(),
                date: "2024-02-10".to_string(),
                location: "Cape Town".to_string(),
                discipline: "Prone".to_string(),
                status: "completed".to_string(),
                score: Some(92.0),
                x_count: Some(6),
                position: Some(5),
                total_participants: Some(15),
            },
        ],
        summary: Some(AnalyticsSummary {
            total_matches: 18,
            total_score: 1647.0,
            average_score: 91.5,
            personal_best: 98.0,
            total_x_count: 105,
            average_x_count: 5.8,
            improvement_rate: 3.2,
            consistency_score: 85.4,
        }),
    }
}
