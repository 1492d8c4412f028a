//! Host map and render surface abstractions
//!
//! The layer never talks to a map engine directly. The host implements
//! [`MapHost`] to report viewports and deliver pan/zoom notifications, and
//! [`RenderSurface`] to receive markers.

use std::fmt;

use tokio::sync::mpsc;

use crate::geo::Bounds;
use crate::reconcile::Marker;

/// Kind of viewport notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewportEventKind {
    /// A pan finished.
    MoveEnd,
    /// A zoom finished.
    ZoomEnd,
}

impl fmt::Display for ViewportEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewportEventKind::MoveEnd => f.write_str("moveend"),
            ViewportEventKind::ZoomEnd => f.write_str("zoomend"),
        }
    }
}

/// Viewport change notification.
///
/// Carries the visible bounds at the time of the event so consumers never
/// query the map back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportEvent {
    /// What triggered the event.
    pub kind: ViewportEventKind,
    /// Visible bounds after the change.
    pub bounds: Bounds,
}

impl ViewportEvent {
    /// Create a pan-end event.
    pub fn move_end(bounds: Bounds) -> Self {
        Self {
            kind: ViewportEventKind::MoveEnd,
            bounds,
        }
    }

    /// Create a zoom-end event.
    pub fn zoom_end(bounds: Bounds) -> Self {
        Self {
            kind: ViewportEventKind::ZoomEnd,
            bounds,
        }
    }
}

/// Sending half handed to the host on subscription.
pub type ViewportSender = mpsc::UnboundedSender<ViewportEvent>;

/// Handle identifying a viewport subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Map engine the layer is attached to.
pub trait MapHost: Send + Sync {
    /// Current visible bounds.
    fn visible_bounds(&self) -> Bounds;

    /// Start delivering move-end and zoom-end events to `sender`.
    fn subscribe(&self, sender: ViewportSender) -> SubscriptionId;

    /// Stop delivering events for a subscription.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Container receiving the layer's markers.
///
/// Markers are only ever added. The host removes the whole container when
/// the layer is detached.
pub trait RenderSurface: Send {
    /// Add a marker to the surface.
    fn add_marker(&mut self, marker: &Marker);
}

impl<T: RenderSurface + ?Sized> RenderSurface for Box<T> {
    fn add_marker(&mut self, marker: &Marker) {
        (**self).add_marker(marker)
    }
}
