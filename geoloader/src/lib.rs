//! GeoLoader - Incremental point loading for map overlays
//!
//! This library loads point records from a remote endpoint as the user pans
//! and zooms a map. It remembers which geographic region has already been
//! fetched, requests only the union region when the viewport escapes it,
//! deduplicates records by identifier and creates exactly one marker per
//! identifier.
//!
//! # Architecture
//!
//! ```text
//! MapHost ──ViewportEvent──► RegionTracker ──Bounds──► FetchRequest
//!                                                          │
//!                                                    FetchTransport
//!                                                          │
//! RenderSurface ◄──Marker── MarkerReconciler ◄──NewRecordSet── DataStore
//! ```
//!
//! # Example
//!
//! ```ignore
//! use geoloader::layer::{DynamicLayer, LayerOptions};
//! use geoloader::geo::Bounds;
//!
//! let options = LayerOptions::new("https://example.com/points?bbox={minlat},{minlng},{maxlat},{maxlng}")
//!     .with_timeout_secs(10);
//! let mut layer = DynamicLayer::with_http(options, surface)?;
//!
//! let outcome = layer.update(Bounds::new(0.0, 0.0, 10.0, 10.0)).await;
//! ```

pub mod geo;
pub mod host;
pub mod icon;
pub mod layer;
pub mod logging;
pub mod reconcile;
pub mod record;
pub mod region;
pub mod request;
pub mod store;
pub mod telemetry;
pub mod transport;

#[cfg(any(test, feature = "testkit"))]
pub mod testing;
