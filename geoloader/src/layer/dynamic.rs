//! Layer state and the update cycle.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::config::{LayerConfig, LayerOptions};
use super::error::{ConfigError, LayerError};
use crate::geo::Bounds;
use crate::host::RenderSurface;
use crate::reconcile::{DataStore, Marker, MarkerReconciler, MergeSummary, NewRecordSet};
use crate::region::RegionTracker;
use crate::request::{FetchRequest, RequestBuilder};
use crate::telemetry::{LayerMetrics, LayerStatsSnapshot};
use crate::transport::{FetchResponse, FetchTransport, ReqwestTransport, TransportError};

/// A resolved fetch: the request and its single outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchCompletion {
    /// The request that was sent.
    pub request: FetchRequest,
    /// What the transport returned.
    pub result: Result<FetchResponse, TransportError>,
}

/// Result of one pass through the update cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The loaded region already covered the viewport.
    Skipped,
    /// The region was fetched and merged.
    Loaded {
        /// Region that is now the loaded region.
        region: Bounds,
        /// Markers created for identifiers seen for the first time.
        markers: Vec<Marker>,
        /// Merge counters.
        summary: MergeSummary,
    },
    /// The transport failed; the loaded region is unchanged.
    Failed {
        /// Region that was requested.
        region: Bounds,
        /// Transport error.
        error: TransportError,
    },
}

impl UpdateOutcome {
    /// Returns true if a fetch was issued and failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, UpdateOutcome::Failed { .. })
    }
}

/// Run a request against a transport.
pub async fn execute(transport: &dyn FetchTransport, request: FetchRequest) -> FetchCompletion {
    let result = transport.fetch(&request).await;
    FetchCompletion { request, result }
}

/// Map overlay that loads points for the visible region on demand.
pub struct DynamicLayer<S> {
    config: LayerConfig,
    requests: RequestBuilder,
    tracker: RegionTracker,
    data: DataStore,
    reconciler: MarkerReconciler,
    pending: Option<NewRecordSet>,
    surface: S,
    transport: Arc<dyn FetchTransport>,
    metrics: Arc<LayerMetrics>,
}

impl<S: RenderSurface> DynamicLayer<S> {
    /// Create a layer.
    ///
    /// Fails with [`LayerError::Config`] if the options are invalid; no fetch
    /// is attempted before construction succeeds.
    pub fn new(
        options: LayerOptions,
        transport: Arc<dyn FetchTransport>,
        surface: S,
    ) -> Result<Self, LayerError> {
        let config = LayerConfig::from_options(options)?;
        Ok(Self::from_config(config, transport, surface))
    }

    /// Create a layer fetching over HTTP.
    ///
    /// The transport is a [`ReqwestTransport`] using the configured
    /// `timeout_secs`.
    pub fn with_http(options: LayerOptions, surface: S) -> Result<Self, LayerError> {
        let config = LayerConfig::from_options(options)?;
        let transport = ReqwestTransport::with_timeout(config.timeout_secs)
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        debug!(timeout_secs = config.timeout_secs, "Built HTTP transport");
        Ok(Self::from_config(config, Arc::new(transport), surface))
    }

    fn from_config(config: LayerConfig, transport: Arc<dyn FetchTransport>, surface: S) -> Self {
        let requests = config.request_builder();
        let data = DataStore::in_memory(config.fields.clone());
        let reconciler = MarkerReconciler::new(config.icon.clone());

        Self {
            config,
            requests,
            tracker: RegionTracker::new(),
            data,
            reconciler,
            pending: None,
            surface,
            transport,
            metrics: Arc::new(LayerMetrics::new()),
        }
    }

    /// Decide whether `visible` needs a fetch.
    ///
    /// Returns the request to run, or `None` if the loaded region already
    /// contains the viewport. Nothing is mutated until [`Self::complete`].
    pub fn on_viewport_change(&mut self, visible: Bounds) -> Option<FetchRequest> {
        self.metrics.viewport_seen();

        let Some(region) = self.tracker.plan(&visible).region() else {
            self.metrics.fetch_skipped();
            return None;
        };

        let request = self.requests.build(&region);
        self.metrics.fetch_started();
        debug!(url = %request.url, "Issuing fetch");
        Some(request)
    }

    /// Build a request for an explicit region.
    ///
    /// Fails with [`LayerError::MissingBounds`] when no region is given.
    pub fn request_for(&self, region: Option<Bounds>) -> Result<FetchRequest, LayerError> {
        let region = region.ok_or(LayerError::MissingBounds)?;
        Ok(self.requests.build(&region))
    }

    /// Request the loaded region again to pick up identifiers added upstream.
    ///
    /// Fails with [`LayerError::MissingBounds`] before the first load.
    pub fn refresh(&mut self) -> Result<FetchRequest, LayerError> {
        let request = self.request_for(self.tracker.loaded())?;
        self.metrics.fetch_started();
        Ok(request)
    }

    /// Apply the outcome of a fetch.
    ///
    /// On success the loaded region becomes the requested region before any
    /// record is merged; new identifiers are then materialised as markers.
    /// On failure the loaded region is left untouched and the error is
    /// logged and returned as [`UpdateOutcome::Failed`].
    pub fn complete(&mut self, completion: FetchCompletion) -> UpdateOutcome {
        let region = completion.request.region;

        let response = match completion.result {
            Ok(response) => response,
            Err(error) => {
                self.metrics.fetch_failed();
                warn!(region = %region, error = %error, "Data load failed");
                return UpdateOutcome::Failed { region, error };
            }
        };

        self.tracker.commit(region);
        self.metrics.fetch_completed();

        let set = self.data.merge(response);
        let summary = set.summary();
        self.metrics.merged(&summary);

        let markers = if set.is_empty() {
            Vec::new()
        } else {
            self.pending = Some(set);
            self.materialize_pending()
        };

        info!(
            region = %region,
            received = summary.received,
            new = summary.inserted,
            markers = markers.len(),
            "Loaded region"
        );

        UpdateOutcome::Loaded {
            region,
            markers,
            summary,
        }
    }

    /// Create markers for the pending record set, if any.
    pub fn materialize_pending(&mut self) -> Vec<Marker> {
        let Some(set) = self.pending.take() else {
            return Vec::new();
        };
        let created = self.reconciler.materialize(set, &mut self.surface);
        self.metrics.markers_created(created.len());
        created
    }

    /// Plan, fetch and apply in one call.
    pub async fn update(&mut self, visible: Bounds) -> UpdateOutcome {
        let Some(request) = self.on_viewport_change(visible) else {
            return UpdateOutcome::Skipped;
        };
        let completion = execute(self.transport.as_ref(), request).await;
        self.complete(completion)
    }
}

impl<S> DynamicLayer<S> {
    /// Validated configuration.
    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// Region known to be loaded.
    pub fn loaded_region(&self) -> Option<Bounds> {
        self.tracker.loaded()
    }

    /// Record store.
    pub fn data(&self) -> &DataStore {
        &self.data
    }

    /// Marker set.
    pub fn markers(&self) -> &MarkerReconciler {
        &self.reconciler
    }

    /// Render surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable render surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Shared handle to the transport.
    pub fn transport(&self) -> Arc<dyn FetchTransport> {
        Arc::clone(&self.transport)
    }

    /// Shared handle to the counters.
    pub fn metrics(&self) -> Arc<LayerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Point-in-time copy of the counters.
    pub fn stats(&self) -> LayerStatsSnapshot {
        self.metrics.snapshot()
    }
}
