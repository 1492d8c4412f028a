//! Binding a layer to a host map.
//!
//! ```text
//! MapHost ──ViewportEvent──► event loop ──plan (lock)──► tokio::spawn
//!                                                          │ fetch (no lock)
//!                                                          ▼
//!                          outcomes ◄──complete (lock)── DynamicLayer
//! ```
//!
//! Every triggered fetch runs in its own task. Fetches are neither
//! coalesced nor cancelled: if the viewport escapes again while a fetch is
//! in flight, a second one is issued, and completions are applied in the
//! order they resolve.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::dynamic::{execute, DynamicLayer, UpdateOutcome};
use crate::geo::Bounds;
use crate::host::{MapHost, RenderSurface, SubscriptionId};

/// A layer attached to a [`MapHost`].
pub struct AttachedLayer<S> {
    layer: Arc<Mutex<DynamicLayer<S>>>,
    host: Arc<dyn MapHost>,
    subscription: SubscriptionId,
    event_loop: JoinHandle<()>,
}

impl<S: RenderSurface + 'static> AttachedLayer<S> {
    /// Attach a layer to a host.
    ///
    /// Subscribes to viewport events, loads the current viewport and starts
    /// the event loop. Every update, including skipped ones, is reported on
    /// the returned receiver. Must be called inside a Tokio runtime.
    pub fn attach(
        layer: DynamicLayer<S>,
        host: Arc<dyn MapHost>,
    ) -> (Self, mpsc::UnboundedReceiver<UpdateOutcome>) {
        let layer = Arc::new(Mutex::new(layer));
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();

        let subscription = host.subscribe(event_tx);
        info!(subscription = subscription.0, "Layer attached");

        dispatch(&layer, host.visible_bounds(), &outcome_tx);

        let loop_layer = Arc::clone(&layer);
        let event_loop = tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                debug!(kind = %event.kind, bounds = %event.bounds, "Viewport event");
                dispatch(&loop_layer, event.bounds, &outcome_tx);
            }
        });

        let attached = Self {
            layer,
            host,
            subscription,
            event_loop,
        };
        (attached, outcome_rx)
    }

    /// Shared handle to the layer.
    pub fn layer(&self) -> Arc<Mutex<DynamicLayer<S>>> {
        Arc::clone(&self.layer)
    }

    /// Unsubscribe from the host and stop the event loop.
    ///
    /// Fetches already in flight still complete and are applied. Store and
    /// loaded region are kept; the returned handle gives access to them.
    pub fn detach(self) -> Arc<Mutex<DynamicLayer<S>>> {
        self.host.unsubscribe(self.subscription);
        self.event_loop.abort();
        info!(subscription = self.subscription.0, "Layer detached");
        self.layer
    }
}

fn dispatch<S: RenderSurface + 'static>(
    layer: &Arc<Mutex<DynamicLayer<S>>>,
    visible: Bounds,
    outcomes: &mpsc::UnboundedSender<UpdateOutcome>,
) {
    let planned = {
        let mut guard = layer.lock();
        guard
            .on_viewport_change(visible)
            .map(|request| (request, guard.transport()))
    };

    let Some((request, transport)) = planned else {
        let _ = outcomes.send(UpdateOutcome::Skipped);
        return;
    };

    let layer = Arc::clone(layer);
    let outcomes = outcomes.clone();
    tokio::spawn(async move {
        let completion = execute(transport.as_ref(), request).await;
        let outcome = layer.lock().complete(completion);
        let _ = outcomes.send(outcome);
    });
}
