//! Record merging and marker reconciliation
//!
//! Fetch responses flow through two steps:
//!
//! 1. [`DataStore::merge`] writes every valid record into the store and
//!    returns the identifiers seen for the first time as a [`NewRecordSet`].
//! 2. [`MarkerReconciler::materialize`] creates one [`Marker`] per new
//!    identifier and hands it to the render surface.
//!
//! Records that reappear update the store only. Their marker keeps the
//! position and icon it was created with.

mod marker;
mod merge;

pub use marker::{Marker, MarkerReconciler};
pub use merge::{DataStore, MergeSummary, NewRecord, NewRecordSet};
