//! Geographic primitives
//!
//! Provides the point and rectangle types the layer reasons about. A
//! rectangle is expressed by its south/west/north/east edges in degrees;
//! containment is inclusive on every edge.

mod bounds;

pub use bounds::{Bounds, LatLng};
