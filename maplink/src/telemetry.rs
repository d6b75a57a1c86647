//! Bridge telemetry for observability.
//!
//! Lock-free atomic counters recording what crosses the bridge boundary:
//! how many operations were submitted, how each one terminated, and how many
//! resources were seeded into the cache. Counters are cheap enough to update
//! from engine worker threads without coordination.
//!
//! # Example
//!
//! ```
//! use maplink::telemetry::BridgeMetrics;
//!
//! let metrics = BridgeMetrics::new();
//! metrics.operation_submitted();
//! metrics.operation_succeeded();
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.operations_submitted, 1);
//! assert_eq!(snapshot.operations_succeeded, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counters for bridge activity.
///
/// One instance is shared between the broker and the seeder; views read a
/// point-in-time [`MetricsSnapshot`] instead of touching the atomics.
#[derive(Debug, Default)]
pub struct BridgeMetrics {
    operations_submitted: AtomicU64,
    operations_succeeded: AtomicU64,
    operations_failed: AtomicU64,
    operations_empty: AtomicU64,
    resources_seeded: AtomicU64,
}

impl BridgeMetrics {
    /// Create a new metrics instance with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an operation submission.
    pub fn operation_submitted(&self) {
        self.operations_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a success dispatch.
    pub fn operation_succeeded(&self) {
        self.operations_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an error dispatch.
    pub fn operation_failed(&self) {
        self.operations_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completion that carried no result and dispatched nothing.
    pub fn operation_empty(&self) {
        self.operations_empty.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a resource seeded into the cache.
    pub fn resource_seeded(&self) {
        self.resources_seeded.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            operations_submitted: self.operations_submitted.load(Ordering::Relaxed),
            operations_succeeded: self.operations_succeeded.load(Ordering::Relaxed),
            operations_failed: self.operations_failed.load(Ordering::Relaxed),
            operations_empty: self.operations_empty.load(Ordering::Relaxed),
            resources_seeded: self.resources_seeded.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`BridgeMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Operations handed to the engine.
    pub operations_submitted: u64,
    /// Operations that dispatched a success callback.
    pub operations_succeeded: u64,
    /// Operations that dispatched an error callback.
    pub operations_failed: u64,
    /// Operations that completed with no result and no dispatch.
    pub operations_empty: u64,
    /// Resources seeded into the cache.
    pub resources_seeded: u64,
}

impl MetricsSnapshot {
    /// Total number of terminated operations.
    pub fn operations_completed(&self) -> u64 {
        self.operations_succeeded + self.operations_failed + self.operations_empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_zero() {
        let snapshot = BridgeMetrics::new().snapshot();
        assert_eq!(snapshot, MetricsSnapshot::default());
        assert_eq!(snapshot.operations_completed(), 0);
    }

    #[test]
    fn test_counters_accumulate() {
        let metrics = BridgeMetrics::new();
        metrics.operation_submitted();
        metrics.operation_submitted();
        metrics.operation_succeeded();
        metrics.operation_failed();
        metrics.resource_seeded();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.operations_submitted, 2);
        assert_eq!(snapshot.operations_succeeded, 1);
        assert_eq!(snapshot.operations_failed, 1);
        assert_eq!(snapshot.operations_empty, 0);
        assert_eq!(snapshot.resources_seeded, 1);
    }

    #[test]
    fn test_completed_sums_terminal_outcomes() {
        let metrics = BridgeMetrics::new();
        metrics.operation_succeeded();
        metrics.operation_failed();
        metrics.operation_empty();

        assert_eq!(metrics.snapshot().operations_completed(), 3);
    }

    #[test]
    fn test_concurrent_updates() {
        use std::sync::Arc;

        let metrics = Arc::new(BridgeMetrics::new());
        let mut handles = Vec::new();

        for _ in 0..8 {
            let metrics = Arc::clone(&metrics);
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    metrics.operation_submitted();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.snapshot().operations_submitted, 800);
    }
}
