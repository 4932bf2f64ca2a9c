//! Metrics collection module
//!
//! Tracks search counts, pages fetched, failures and response times.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Number of response times kept for the rolling average
const RESPONSE_TIME_WINDOW: usize = 100;

/// Process-wide search metrics
pub struct Metrics {
    /// Searches started with a non-blank term
    total_searches: AtomicU64,
    /// Searches that completed with a result set
    successes: AtomicU64,
    /// Pages returned by the transport
    pages_fetched: AtomicU64,
    /// Entries dropped for lacking a rank
    entries_dropped: AtomicU64,
    /// Failures by error kind
    failures: RwLock<HashMap<String, u64>>,
    /// Whole-search response times in ms
    response_times: RwLock<Vec<u64>>,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            total_searches: AtomicU64::new(0),
            successes: AtomicU64::new(0),
            pages_fetched: AtomicU64::new(0),
            entries_dropped: AtomicU64::new(0),
            failures: RwLock::new(HashMap::new()),
            response_times: RwLock::new(Vec::new()),
        }
    }

    /// Increment total search count
    pub fn inc_search(&self) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one fetched page and how many of its entries were dropped
    pub fn record_page(&self, dropped: usize) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
        self.entries_dropped
            .fetch_add(dropped as u64, Ordering::Relaxed);
    }

    /// Record a completed search
    pub fn record_success(&self, time_ms: u64) {
        self.successes.fetch_add(1, Ordering::Relaxed);
        self.record_response_time(time_ms);
    }

    /// Record a failed search by error kind
    pub fn record_failure(&self, kind: &str) {
        let mut failures = self.failures.write().unwrap();
        *failures.entry(kind.to_string()).or_insert(0) += 1;
    }

    fn record_response_time(&self, time_ms: u64) {
        let mut times = self.response_times.write().unwrap();
        if times.len() >= RESPONSE_TIME_WINDOW {
            times.remove(0);
        }
        times.push(time_ms);
    }

    /// Get total searches
    pub fn get_total_searches(&self) -> u64 {
        self.total_searches.load(Ordering::Relaxed)
    }

    /// Get average response time over the rolling window
    pub fn get_avg_response_time(&self) -> Option<u64> {
        let times = self.response_times.read().unwrap();
        if times.is_empty() {
            None
        } else {
            Some(times.iter().sum::<u64>() / times.len() as u64)
        }
    }

    /// Get reliability percentage
    pub fn get_reliability(&self) -> f64 {
        let failures: u64 = self.failures.read().unwrap().values().sum();
        let successes = self.successes.load(Ordering::Relaxed);

        let total = failures + successes;
        if total == 0 {
            100.0
        } else {
            (successes as f64 / total as f64) * 100.0
        }
    }

    /// Point-in-time copy for reporting
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_searches: self.get_total_searches(),
            successes: self.successes.load(Ordering::Relaxed),
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            entries_dropped: self.entries_dropped.load(Ordering::Relaxed),
            failures: self.failures.read().unwrap().clone(),
            avg_response_time_ms: self.get_avg_response_time(),
            reliability: self.get_reliability(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable metrics report
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_searches: u64,
    pub successes: u64,
    pub pages_fetched: u64,
    pub entries_dropped: u64,
    pub failures: HashMap<String, u64>,
    pub avg_response_time_ms: Option<u64>,
    pub reliability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let metrics = Metrics::new();

        metrics.inc_search();
        metrics.record_page(2);
        metrics.record_page(0);
        metrics.record_success(100);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_searches, 1);
        assert_eq!(snapshot.pages_fetched, 2);
        assert_eq!(snapshot.entries_dropped, 2);
        assert_eq!(snapshot.avg_response_time_ms, Some(100));
        assert_eq!(snapshot.reliability, 100.0);
    }

    #[test]
    fn test_failures_lower_reliability() {
        let metrics = Metrics::new();

        metrics.record_success(10);
        metrics.record_failure("transport");
        metrics.record_failure("transport");
        metrics.record_success(30);

        assert_eq!(metrics.get_reliability(), 50.0);
        assert_eq!(metrics.snapshot().failures.get("transport"), Some(&2));
        assert_eq!(metrics.get_avg_response_time(), Some(20));
    }

    #[test]
    fn test_response_time_window() {
        let metrics = Metrics::new();
        metrics.record_success(1_000_000);
        for _ in 0..RESPONSE_TIME_WINDOW {
            metrics.record_success(10);
        }
        assert_eq!(metrics.get_avg_response_time(), Some(10));
    }
}
