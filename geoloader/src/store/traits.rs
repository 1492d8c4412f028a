//! Core trait for record storage.
//!
//! # Design Principles
//!
//! - **String keys**: records are addressed by their normalised [`RecordId`]
//! - **Monotonic**: there is no delete; a key, once present, stays present
//! - **Minimal interface**: only what merging and inspection need

use crate::record::{Record, RecordId};

/// Outcome of an [`RecordStore::upsert`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The key was not present before.
    Inserted,
    /// The key was present and its record has been replaced.
    Replaced,
}

/// Associative container mapping identifiers to their latest record.
///
/// Implementations hold exactly one record per identifier.
pub trait RecordStore: Send {
    /// Look up the current record for an identifier.
    fn get(&self, id: &RecordId) -> Option<&Record>;

    /// Insert or overwrite the record for an identifier.
    fn upsert(&mut self, id: RecordId, record: Record) -> Upsert;

    /// All identifiers currently stored, in no particular order.
    fn keys(&self) -> Vec<RecordId>;

    /// Number of stored identifiers.
    fn len(&self) -> usize;

    /// Returns true if nothing has been stored yet.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the identifier is present.
    fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }
}
