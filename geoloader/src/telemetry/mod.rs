//! Layer telemetry for observability.
//!
//! Lock-free atomic counters updated by the layer as it plans, fetches and
//! reconciles. Consumers take a [`LayerStatsSnapshot`] to display or log.
//!
//! # Architecture
//!
//! ```text
//! DynamicLayer ─────► LayerMetrics ─────► LayerStatsSnapshot ─────► Views
//!                     (atomic counters)   (point-in-time copy)      (logs, UI)
//! ```

mod metrics;
mod snapshot;

pub use metrics::LayerMetrics;
pub use snapshot::LayerStatsSnapshot;
