//! Atomic counters.

use std::sync::atomic::{AtomicU64, Ordering};

use super::snapshot::LayerStatsSnapshot;
use crate::reconcile::MergeSummary;

/// Counters shared between the layer and its observers.
#[derive(Debug, Default)]
pub struct LayerMetrics {
    viewports_seen: AtomicU64,
    fetches_skipped: AtomicU64,
    fetches_started: AtomicU64,
    fetches_completed: AtomicU64,
    fetches_failed: AtomicU64,
    records_received: AtomicU64,
    records_new: AtomicU64,
    records_replaced: AtomicU64,
    records_rejected: AtomicU64,
    markers_created: AtomicU64,
}

impl LayerMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a processed viewport change.
    pub fn viewport_seen(&self) {
        self.viewports_seen.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a viewport already covered by the loaded region.
    pub fn fetch_skipped(&self) {
        self.fetches_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Count an issued fetch.
    pub fn fetch_started(&self) {
        self.fetches_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a fetch that returned a response.
    pub fn fetch_completed(&self) {
        self.fetches_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a fetch that failed in transport.
    pub fn fetch_failed(&self) {
        self.fetches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the counters of one merge.
    pub fn merged(&self, summary: &MergeSummary) {
        self.records_received.fetch_add(summary.received as u64, Ordering::Relaxed);
        self.records_new.fetch_add(summary.inserted as u64, Ordering::Relaxed);
        self.records_replaced.fetch_add(summary.replaced as u64, Ordering::Relaxed);
        self.records_rejected.fetch_add(summary.rejected as u64, Ordering::Relaxed);
    }

    /// Count markers handed to the render surface.
    pub fn markers_created(&self, count: usize) {
        self.markers_created.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters.
    pub fn snapshot(&self) -> LayerStatsSnapshot {
        LayerStatsSnapshot {
            viewports_seen: self.viewports_seen.load(Ordering::Relaxed),
            fetches_skipped: self.fetches_skipped.load(Ordering::Relaxed),
            fetches_started: self.fetches_started.load(Ordering::Relaxed),
            fetches_completed: self.fetches_completed.load(Ordering::Relaxed),
            fetches_failed: self.fetches_failed.load(Ordering::Relaxed),
            records_received: self.records_received.load(Ordering::Relaxed),
            records_new: self.records_new.load(Ordering::Relaxed),
            records_replaced: self.records_replaced.load(Ordering::Relaxed),
            records_rejected: self.records_rejected.load(Ordering::Relaxed),
            markers_created: self.markers_created.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = LayerMetrics::new();
        metrics.viewport_seen();
        metrics.viewport_seen();
        metrics.fetch_skipped();
        metrics.fetch_started();
        metrics.fetch_completed();
        metrics.merged(&MergeSummary {
            received: 4,
            inserted: 2,
            replaced: 1,
            rejected: 1,
        });
        metrics.markers_created(2);

        let snap = metrics.snapshot();
        assert_eq!(snap.viewports_seen, 2);
        assert_eq!(snap.fetches_skipped, 1);
        assert_eq!(snap.fetches_in_flight(), 0);
        assert_eq!(snap.records_received, 4);
        assert_eq!(snap.records_new, 2);
        assert_eq!(snap.records_rejected, 1);
        assert_eq!(snap.markers_created, 2);
    }
}
