// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod analytics;
pub mod filters;
pub mod session;

pub use analytics::{
    AnalyticsSummary, DisciplineStats, EventParticipation, PerformanceTrend, ScoreDataPoint,
    UserAnalytics,
};
pub use filters::{AnalyticsFilters, DateRange, FiltersUpdate, Period, RangeBound};
pub use session::{LoginRequest, LoginResponse, RefreshResponse, SessionUser};
