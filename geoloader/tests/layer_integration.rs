//! Integration tests for the dynamic layer.
//!
//! These tests drive the complete flow:
//! - viewport change → region planning → templated request
//! - transport response → loaded region → store merge → markers
//! - host attachment, event delivery and detachment
//!
//! Run with: `cargo test --test layer_integration`

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};

use geoloader::geo::{Bounds, LatLng};
use geoloader::host::MapHost;
use geoloader::icon::{Icon, IconPolicy};
use geoloader::layer::{AttachedLayer, DynamicLayer, LayerError, LayerOptions, UpdateOutcome};
use geoloader::record::RecordId;
use geoloader::request::FetchRequest;
use geoloader::testing::{records, MockHost, MockTransport, RecordingSurface};
use geoloader::transport::{BoxFuture, FetchResponse, FetchTransport, TransportError};

// ============================================================================
// Helper Functions
// ============================================================================

const BBOX_URL: &str = "http://x/?bbox={minlat},{minlng},{maxlat},{maxlng}";

fn square(south: f64, west: f64, size: f64) -> Bounds {
    Bounds::new(south, west, south + size, west + size)
}

fn new_layer(transport: Arc<dyn FetchTransport>) -> DynamicLayer<RecordingSurface> {
    DynamicLayer::new(LayerOptions::new(BBOX_URL), transport, RecordingSurface::new())
        .expect("valid options")
}

async fn next_outcome(rx: &mut mpsc::UnboundedReceiver<UpdateOutcome>) -> UpdateOutcome {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("outcome within timeout")
        .expect("outcome channel open")
}

/// Transport whose responses are released by the test, per URL.
#[derive(Default)]
struct GatedTransport {
    gates: Mutex<HashMap<String, oneshot::Receiver<Result<FetchResponse, TransportError>>>>,
}

impl GatedTransport {
    fn gate(&self, url: &str) -> oneshot::Sender<Result<FetchResponse, TransportError>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(url.to_string(), rx);
        tx
    }
}

impl FetchTransport for GatedTransport {
    fn fetch<'a>(
        &'a self,
        request: &'a FetchRequest,
    ) -> BoxFuture<'a, Result<FetchResponse, TransportError>> {
        let gate = self.gates.lock().remove(&request.url);
        Box::pin(async move {
            match gate {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(TransportError::Http("gate dropped".to_string()))),
                None => Err(TransportError::Http(format!("no gate for {}", request.url))),
            }
        })
    }
}

// ============================================================================
// Scenarios
// ============================================================================

/// First load, repeated viewport, then a moved record.
#[tokio::test]
async fn test_load_repeat_and_moved_record_scenario() {
    let transport = Arc::new(MockTransport::new());
    transport.push_ok(records(json!([{"id": 1, "lat": 5, "lng": 5}])));
    let mut layer = new_layer(transport.clone());

    let viewport = Bounds::new(0.0, 0.0, 10.0, 10.0);

    // First viewport: one fetch, one marker at (5, 5).
    let outcome = layer.update(viewport).await;
    assert!(matches!(outcome, UpdateOutcome::Loaded { .. }));
    assert_eq!(transport.request_count(), 1);
    assert_eq!(transport.requests()[0].url, "http://x/?bbox=0,0,10,10");
    assert_eq!(layer.loaded_region(), Some(viewport));
    assert_eq!(layer.data().len(), 1);
    assert_eq!(layer.surface().markers().len(), 1);
    assert_eq!(layer.surface().markers()[0].position, LatLng::new(5.0, 5.0));

    // Same viewport again: no fetch.
    assert_eq!(layer.update(viewport).await, UpdateOutcome::Skipped);
    assert_eq!(transport.request_count(), 1);

    // Same id delivered with new coordinates: store updates, marker stays.
    transport.push_ok(records(json!([{"id": 1, "lat": 6, "lng": 6}])));
    let request = layer.refresh().expect("region is loaded");
    let completion = geoloader::layer::execute(transport.as_ref(), request).await;
    layer.complete(completion);

    let id = RecordId::new("1");
    assert_eq!(layer.data().get(&id).unwrap().get_f64("lat"), Some(6.0));
    assert_eq!(layer.markers().get(&id).unwrap().position, LatLng::new(5.0, 5.0));
    assert_eq!(layer.surface().markers().len(), 1);
}

#[tokio::test]
async fn test_union_request_after_partial_escape() {
    let transport = Arc::new(MockTransport::new());
    let mut layer = new_layer(transport.clone());

    layer.update(Bounds::new(0.0, 0.0, 10.0, 10.0)).await;
    layer.update(Bounds::new(5.0, 5.0, 15.0, 15.0)).await;

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].region, Bounds::new(0.0, 0.0, 15.0, 15.0));
    assert_eq!(layer.loaded_region(), Some(Bounds::new(0.0, 0.0, 15.0, 15.0)));

    // Anything inside the union is now covered.
    assert_eq!(
        layer.update(Bounds::new(12.0, 1.0, 14.0, 3.0)).await,
        UpdateOutcome::Skipped
    );
}

#[tokio::test]
async fn test_transport_failure_is_not_fatal() {
    let transport = Arc::new(MockTransport::new());
    transport.push(Err(TransportError::Status {
        status: 503,
        url: "http://x/".to_string(),
    }));
    transport.push_ok(records(json!([{"id": "a", "lat": 1, "lng": 1}])));
    let mut layer = new_layer(transport.clone());
    let viewport = square(0.0, 0.0, 2.0);

    let failed = layer.update(viewport).await;
    assert!(failed.is_failure());
    assert_eq!(layer.loaded_region(), None);

    // The next viewport change retries the same region.
    let loaded = layer.update(viewport).await;
    assert!(matches!(loaded, UpdateOutcome::Loaded { ref markers, .. } if markers.len() == 1));
    assert_eq!(transport.requests()[0].region, transport.requests()[1].region);

    let stats = layer.stats();
    assert_eq!(stats.fetches_failed, 1);
    assert_eq!(stats.fetches_completed, 1);
    assert_eq!(stats.markers_created, 1);
}

#[tokio::test]
async fn test_params_data_and_custom_fields_flow_through() {
    let transport = Arc::new(MockTransport::new());
    transport.push_ok(records(json!([
        {"uuid": "x1", "y": 41.0, "x": 29.0, "kind": "mosque"},
        {"uuid": "x2", "y": 41.1, "x": 29.1}
    ])));

    let options = LayerOptions::new(BBOX_URL)
        .with_id_field("uuid")
        .with_coordinate_fields("y", "x")
        .with_param("limit", "100")
        .with_data(json!({"lang": "tr"}))
        .with_icon(IconPolicy::per_record(|r| {
            Icon::named(r.get("kind").and_then(|v| v.as_str()).unwrap_or("poi"))
        }));
    let mut layer =
        DynamicLayer::new(options, transport.clone(), RecordingSurface::new()).unwrap();

    layer.update(Bounds::new(40.0, 28.0, 42.0, 30.0)).await;

    let request = &transport.requests()[0];
    assert_eq!(request.url, "http://x/?bbox=40,28,42,30&limit=100");
    assert_eq!(request.data, Some(json!({"lang": "tr"})));

    let icons: Vec<_> = layer
        .surface()
        .markers()
        .iter()
        .map(|m| m.icon.name().to_string())
        .collect();
    assert_eq!(icons, vec!["mosque", "poi"]);
}

#[tokio::test]
async fn test_http_layer_applies_configured_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let options = LayerOptions::new(format!(
        "http://{}/points?bbox={{minlat}},{{minlng}},{{maxlat}},{{maxlng}}",
        addr
    ))
    .with_timeout_secs(1);
    let mut layer = DynamicLayer::with_http(options, RecordingSurface::new()).unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(5), layer.update(square(0.0, 0.0, 1.0)))
        .await
        .expect("configured timeout fires before the guard");

    assert!(matches!(
        outcome,
        UpdateOutcome::Failed {
            error: TransportError::Http(_),
            ..
        }
    ));
    assert_eq!(layer.loaded_region(), None);
    assert_eq!(layer.stats().fetches_failed, 1);
    server.abort();
}

#[test]
fn test_construction_without_url_is_rejected() {
    let result = DynamicLayer::new(
        LayerOptions::default(),
        Arc::new(MockTransport::new()),
        RecordingSurface::new(),
    );
    assert!(matches!(result, Err(LayerError::Config(_))));
}

// ============================================================================
// Host attachment
// ============================================================================

#[tokio::test]
async fn test_attach_loads_initial_viewport_and_follows_events() {
    let transport = Arc::new(MockTransport::with_responder(|request| {
        let c = request.region.center();
        Ok(Some(records(json!([
            {"id": "fixed", "lat": 1.0, "lng": 1.0},
            {"id": request.url, "lat": c.lat, "lng": c.lng}
        ]))))
    }));
    let host = Arc::new(MockHost::new(square(0.0, 0.0, 2.0)));

    let (attached, mut outcomes) = AttachedLayer::attach(new_layer(transport.clone()), host.clone());
    assert_eq!(host.subscriber_count(), 1);

    // Initial load of the current viewport.
    let initial = next_outcome(&mut outcomes).await;
    assert!(matches!(initial, UpdateOutcome::Loaded { ref markers, .. } if markers.len() == 2));

    // Pan inside the loaded region: skipped.
    host.pan_to(square(0.5, 0.5, 1.0));
    assert_eq!(next_outcome(&mut outcomes).await, UpdateOutcome::Skipped);

    // Zoom out past it: the union is fetched; "fixed" is not duplicated.
    host.zoom_to(square(-1.0, -1.0, 4.0));
    let expanded = next_outcome(&mut outcomes).await;
    match expanded {
        UpdateOutcome::Loaded { region, markers, .. } => {
            assert_eq!(region, square(-1.0, -1.0, 4.0));
            assert_eq!(markers.len(), 1);
        }
        other => panic!("expected load, got {:?}", other),
    }

    let layer = attached.detach();
    assert_eq!(host.subscriber_count(), 0);

    let layer = layer.lock();
    assert_eq!(layer.markers().len(), 3);
    assert_eq!(layer.data().len(), 3);
    assert_eq!(transport.request_count(), 2);
    assert_eq!(layer.loaded_region(), Some(square(-1.0, -1.0, 4.0)));
}

#[tokio::test]
async fn test_events_after_detach_are_ignored() {
    let transport = Arc::new(MockTransport::new());
    let host = Arc::new(MockHost::new(square(0.0, 0.0, 1.0)));

    let (attached, mut outcomes) = AttachedLayer::attach(new_layer(transport.clone()), host.clone());
    next_outcome(&mut outcomes).await;

    let layer = attached.detach();
    host.pan_to(square(50.0, 50.0, 1.0));
    tokio::task::yield_now().await;

    assert_eq!(transport.request_count(), 1);
    assert_eq!(layer.lock().loaded_region(), Some(square(0.0, 0.0, 1.0)));
    assert_eq!(host.visible_bounds(), square(50.0, 50.0, 1.0));
}

/// Overlapping fetches are not serialised. When the newer fetch resolves
/// first, the older one's completion replaces the loaded region, which can
/// then lose coverage the newer fetch had provided.
#[tokio::test]
async fn test_out_of_order_completion_replaces_loaded_region() {
    let transport = Arc::new(GatedTransport::default());
    let first = square(0.0, 0.0, 1.0);
    let second = square(10.0, 10.0, 1.0);
    let release_first = transport.gate("http://x/?bbox=0,0,1,1");
    let release_second = transport.gate("http://x/?bbox=10,10,11,11");

    let host = Arc::new(MockHost::new(first));
    let (attached, mut outcomes) = AttachedLayer::attach(new_layer(transport.clone()), host.clone());

    // Nothing has completed yet, so the second viewport is planned on its own.
    host.pan_to(second);

    release_second
        .send(Ok(Some(records(json!([{"id": 2, "lat": 10.5, "lng": 10.5}])))))
        .unwrap();
    let newer = next_outcome(&mut outcomes).await;
    assert!(matches!(newer, UpdateOutcome::Loaded { region, .. } if region == second));

    release_first
        .send(Ok(Some(records(json!([{"id": 1, "lat": 0.5, "lng": 0.5}])))))
        .unwrap();
    let older = next_outcome(&mut outcomes).await;
    assert!(matches!(older, UpdateOutcome::Loaded { region, .. } if region == first));

    let layer = attached.detach();
    let layer = layer.lock();
    assert_eq!(layer.loaded_region(), Some(first));
    assert!(!layer.loaded_region().unwrap().contains(&second));
    // Both completions merged their records regardless of order.
    assert_eq!(layer.data().len(), 2);
    assert_eq!(layer.markers().len(), 2);
}
