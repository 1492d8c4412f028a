//! Mock collaborators for tests.
//!
//! Available in unit tests and, with the `testkit` feature, to integration
//! tests and downstream crates.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde_json::Value;

use crate::geo::Bounds;
use crate::host::{MapHost, RenderSurface, SubscriptionId, ViewportEvent, ViewportSender};
use crate::reconcile::Marker;
use crate::request::FetchRequest;
use crate::transport::{BoxFuture, FetchResponse, FetchTransport, TransportError};

/// Response elements from a JSON array literal.
///
/// # Panics
///
/// Panics if `value` is not an array.
pub fn records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => panic!("expected a JSON array, got {}", other),
    }
}

type Responder = Box<dyn Fn(&FetchRequest) -> Result<FetchResponse, TransportError> + Send + Sync>;

/// Transport returning scripted responses and recording every request.
///
/// Scripted responses are consumed in order. Once they run out, the
/// responder is used if one is set, otherwise `Ok(None)` is returned.
#[derive(Default)]
pub struct MockTransport {
    scripted: Mutex<VecDeque<Result<FetchResponse, TransportError>>>,
    responder: Option<Responder>,
    requests: Mutex<Vec<FetchRequest>>,
}

impl MockTransport {
    /// Transport answering every request with no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport computing each response from the request.
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&FetchRequest) -> Result<FetchResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::default()
        }
    }

    /// Queue a successful response.
    pub fn push_ok(&self, records: Vec<Value>) {
        self.scripted.lock().push_back(Ok(Some(records)));
    }

    /// Queue an arbitrary result.
    pub fn push(&self, result: Result<FetchResponse, TransportError>) {
        self.scripted.lock().push_back(result);
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl FetchTransport for MockTransport {
    fn fetch<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<FetchResponse, TransportError>> {
        self.requests.lock().push(request.clone());
        let scripted = self.scripted.lock().pop_front();
        let result = match (scripted, &self.responder) {
            (Some(result), _) => result,
            (None, Some(responder)) => responder(request),
            (None, None) => Ok(None),
        };
        Box::pin(async move { result })
    }
}

/// Surface remembering every marker it received.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    markers: Vec<Marker>,
}

impl RecordingSurface {
    /// Surface with no markers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Markers added so far, in order.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }
}

impl RenderSurface for RecordingSurface {
    fn add_marker(&mut self, marker: &Marker) {
        self.markers.push(marker.clone());
    }
}

/// Host map with a scriptable viewport.
pub struct MockHost {
    bounds: Mutex<Bounds>,
    subscribers: Mutex<HashMap<SubscriptionId, ViewportSender>>,
    next_id: AtomicU64,
}

impl MockHost {
    /// Host currently showing `bounds`.
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds: Mutex::new(bounds),
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Pan to `bounds` and notify subscribers with a move-end event.
    pub fn pan_to(&self, bounds: Bounds) {
        self.set_view(ViewportEvent::move_end(bounds));
    }

    /// Zoom to `bounds` and notify subscribers with a zoom-end event.
    pub fn zoom_to(&self, bounds: Bounds) {
        self.set_view(ViewportEvent::zoom_end(bounds));
    }

    /// Number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    fn set_view(&self, event: ViewportEvent) {
        *self.bounds.lock() = event.bounds;
        for sender in self.subscribers.lock().values() {
            let _ = sender.send(event);
        }
    }
}

impl MapHost for MockHost {
    fn visible_bounds(&self) -> Bounds {
        *self.bounds.lock()
    }

    fn subscribe(&self, sender: ViewportSender) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().insert(id, sender);
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.lock().remove(&id);
    }
}
