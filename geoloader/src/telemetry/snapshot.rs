//! Point-in-time copy of layer counters.

use std::fmt;

use serde::Serialize;

/// Snapshot of [`super::LayerMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayerStatsSnapshot {
    /// Viewport changes processed.
    pub viewports_seen: u64,
    /// Viewports already covered by the loaded region.
    pub fetches_skipped: u64,
    /// Fetches issued.
    pub fetches_started: u64,
    /// Fetches that returned records (possibly none).
    pub fetches_completed: u64,
    /// Fetches that failed in transport.
    pub fetches_failed: u64,
    /// Response elements received.
    pub records_received: u64,
    /// Identifiers stored for the first time.
    pub records_new: u64,
    /// Stored records overwritten by a newer copy.
    pub records_replaced: u64,
    /// Elements rejected for not being objects or lacking identifier or
    /// coordinates.
    pub records_rejected: u64,
    /// Markers handed to the render surface.
    pub markers_created: u64,
}

impl LayerStatsSnapshot {
    /// Fetches issued but not yet resolved.
    pub fn fetches_in_flight(&self) -> u64 {
        self.fetches_started
            .saturating_sub(self.fetches_completed + self.fetches_failed)
    }

    /// Share of viewports served without a fetch.
    pub fn skip_ratio(&self) -> f64 {
        if self.viewports_seen == 0 {
            0.0
        } else {
            self.fetches_skipped as f64 / self.viewports_seen as f64
        }
    }
}

impl fmt::Display for LayerStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fetches {}/{} ok, {} failed, {} skipped; records {} new, {} updated, {} rejected; {} markers",
            self.fetches_completed,
            self.fetches_started,
            self.fetches_failed,
            self.fetches_skipped,
            self.records_new,
            self.records_replaced,
            self.records_rejected,
            self.markers_created
        )
    }
}
