// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory analytics cache keyed by the serialized query.

use crate::models::{AnalyticsFilters, DateRange, UserAnalytics};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Default time-to-live of a cache entry (10 minutes).
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// One cached analytics payload.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Arc<UserAnalytics>,
    /// Wall-clock time of the fetch, for display
    pub timestamp: DateTime<Utc>,
    /// Monotonic time of the fetch; the TTL is measured from here
    stored_at: Instant,
}

/// Fields are serialized in declaration order, which keeps keys stable.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CacheKey<'a> {
    user_id: Option<&'a str>,
    filters: &'a AnalyticsFilters,
    date_range: &'a DateRange,
}

/// Filter-keyed analytics cache with a fixed TTL.
///
/// When disabled, lookups always miss and stores are ignored.
pub struct AnalyticsCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    enabled: bool,
}

impl AnalyticsCache {
    pub fn new(enabled: bool, ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            enabled,
        }
    }

    /// Deterministic key for a query. Identical logical queries give identical keys.
    pub fn key(user_id: Option<&str>, filters: &AnalyticsFilters, date_range: &DateRange) -> String {
        let key = CacheKey {
            user_id,
            filters,
            date_range,
        };
        // Serializing plain strings and numbers cannot fail.
        serde_json::to_string(&key).unwrap_or_default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Raw lookup, valid or not.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        if !self.enabled {
            return None;
        }
        self.entries.get(key).map(|entry| entry.clone())
    }

    /// Lookup that only returns entries still inside the TTL.
    pub fn get_valid(&self, key: &str) -> Option<CacheEntry> {
        self.get(key).filter(|entry| self.is_valid(entry))
    }

    pub fn is_valid(&self, entry: &CacheEntry) -> bool {
        entry.stored_at.elapsed() < self.ttl
    }

    /// Store a payload stamped with the current time.
    pub fn put(&self, key: String, data: Arc<UserAnalytics>) -> Option<CacheEntry> {
        if !self.enabled {
            return None;
        }
        let entry = CacheEntry {
            data,
            timestamp: Utc::now(),
            stored_at: Instant::now(),
        };
        self.entries.insert(key, entry.clone());
        Some(entry)
    }

    /// Drop every entry.
    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FiltersUpdate, Period};

    fn range() -> DateRange {
        DateRange::new("2024-01-01", "2024-03-31")
    }

    #[test]
    fn test_key_is_deterministic() {
        let a = AnalyticsFilters::default()
            .merge(&FiltersUpdate::discipline("3P"))
            .merge(&FiltersUpdate::period(Period::Month));
        let b = AnalyticsFilters::default()
            .merge(&FiltersUpdate::period(Period::Month))
            .merge(&FiltersUpdate::discipline("3P"));

        assert_eq!(
            AnalyticsCache::key(Some("u1"), &a, &range()),
            AnalyticsCache::key(Some("u1"), &b, &range())
        );
        assert_ne!(
            AnalyticsCache::key(Some("u1"), &a, &range()),
            AnalyticsCache::key(Some("u2"), &a, &range())
        );
        assert_ne!(
            AnalyticsCache::key(Some("u1"), &a, &range()),
            AnalyticsCache::key(Some("u1"), &a, &DateRange::new("2024-01-02", "2024-03-31"))
        );
    }

    #[test]
    fn test_hit_returns_same_allocation() {
        let cache = AnalyticsCache::new(true, DEFAULT_CACHE_TIMEOUT);
        let data = Arc::new(UserAnalytics::default());

        cache.put("k".to_string(), data.clone());
        let entry = cache.get_valid("k").expect("entry should be cached");

        assert!(Arc::ptr_eq(&entry.data, &data));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_not_valid() {
        let cache = AnalyticsCache::new(true, Duration::from_secs(600));
        cache.put("k".to_string(), Arc::new(UserAnalytics::default()));

        tokio::time::advance(Duration::from_secs(599)).await;
        assert!(cache.get_valid("k").is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get("k").is_some());
        assert!(cache.get_valid("k").is_none());
    }

    #[test]
    fn test_disabled_cache_never_hits() {
        let cache = AnalyticsCache::new(false, DEFAULT_CACHE_TIMEOUT);
        assert!(cache
            .put("k".to_string(), Arc::new(UserAnalytics::default()))
            .is_none());
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_all_clears_every_key() {
        let cache = AnalyticsCache::new(true, DEFAULT_CACHE_TIMEOUT);
        cache.put("a".to_string(), Arc::new(UserAnalytics::default()));
        cache.put("b".to_string(), Arc::new(UserAnalytics::default()));
        assert_eq!(cache.len(), 2);

        cache.invalidate_all();
        assert!(cache.is_empty());
    }
}
