//! Loaded-region tracking
//!
//! The [`RegionTracker`] remembers the rectangle that has been fully fetched
//! and decides, for each viewport the host reports, whether anything new must
//! be requested.
//!
//! # Strategy
//!
//! Requests always cover the union of the loaded region and the viewport.
//! The number of fetches in a session is therefore bounded by how often the
//! viewport escapes everything seen so far, not by how often the user pans.
//!
//! ```text
//!   loaded ┌──────────┐            request ┌───────────────┐
//!          │          │                    │               │
//!          │     ┌────┼────┐               │               │
//!          └─────┼────┘    │   ──────►     │               │
//!                │ visible │               │               │
//!                └─────────┘               └───────────────┘
//! ```

use tracing::debug;

use crate::geo::Bounds;

/// What the tracker decided for a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionDecision {
    /// Nothing loaded yet; fetch the viewport itself.
    Initial(Bounds),
    /// The loaded region already covers the viewport.
    Covered,
    /// Fetch the union of the loaded region and the viewport.
    Expand(Bounds),
}

impl RegionDecision {
    /// The region to fetch, if any.
    pub fn region(&self) -> Option<Bounds> {
        match self {
            RegionDecision::Initial(b) | RegionDecision::Expand(b) => Some(*b),
            RegionDecision::Covered => None,
        }
    }
}

/// Tracks the region known to be loaded.
#[derive(Debug, Clone, Default)]
pub struct RegionTracker {
    loaded: Option<Bounds>,
}

impl RegionTracker {
    /// Create a tracker with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently loaded region, if any fetch has completed.
    pub fn loaded(&self) -> Option<Bounds> {
        self.loaded
    }

    /// Decide whether `visible` requires a fetch and which region to request.
    pub fn plan(&self, visible: &Bounds) -> RegionDecision {
        let decision = match &self.loaded {
            None => RegionDecision::Initial(*visible),
            Some(loaded) if loaded.contains(visible) => RegionDecision::Covered,
            Some(loaded) => RegionDecision::Expand(loaded.union(visible)),
        };
        debug!(visible = %visible, decision = ?decision, "Planned viewport");
        decision
    }

    /// Record that a fetch of `requested` completed successfully.
    ///
    /// The loaded region is replaced by the requested one. Requests are
    /// planned as unions, so under in-order completion this only grows.
    pub fn commit(&mut self, requested: Bounds) {
        if let Some(previous) = &self.loaded {
            if !requested.contains(previous) {
                debug!(
                    previous = %previous,
                    requested = %requested,
                    "Committed region does not cover previous loaded region"
                );
            }
        }
        self.loaded = Some(requested);
    }
}
