//! Marker creation for newly seen records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::merge::NewRecordSet;
use crate::geo::LatLng;
use crate::host::RenderSurface;
use crate::icon::{Icon, IconPolicy};
use crate::record::RecordId;

/// Rendered point for one record.
///
/// Position and icon are fixed when the marker is created; later updates of
/// the same record do not move it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Identifier of the record this marker represents.
    pub id: RecordId,
    /// Position at creation time.
    pub position: LatLng,
    /// Icon chosen at creation time.
    pub icon: Icon,
}

/// Owns the marker set and creates markers for new identifiers.
#[derive(Debug, Default)]
pub struct MarkerReconciler {
    icon_policy: IconPolicy,
    markers: HashMap<RecordId, Marker>,
}

impl MarkerReconciler {
    /// Create a reconciler with the given icon policy.
    pub fn new(icon_policy: IconPolicy) -> Self {
        Self {
            icon_policy,
            markers: HashMap::new(),
        }
    }

    /// Marker registered for an identifier.
    pub fn get(&self, id: &RecordId) -> Option<&Marker> {
        self.markers.get(id)
    }

    /// Number of markers created so far.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns true if no marker has been created.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Iterate over all markers.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.values()
    }

    /// Create, register and emit markers for identifiers that have none.
    ///
    /// Identifiers that already own a marker are skipped, so materialising
    /// the same set twice is harmless. Returns the markers created by this
    /// call in set order.
    pub fn materialize(
        &mut self,
        set: NewRecordSet,
        surface: &mut dyn RenderSurface,
    ) -> Vec<Marker> {
        let mut created = Vec::with_capacity(set.len());

        for new in set {
            if self.markers.contains_key(&new.id) {
                debug!(id = %new.id, "Marker already exists, skipping");
                continue;
            }

            let marker = Marker {
                id: new.id.clone(),
                position: new.position,
                icon: self.icon_policy.icon_for(&new.record),
            };
            surface.add_marker(&marker);
            self.markers.insert(new.id, marker.clone());
            created.push(marker);
        }

        created
    }
}
