//! Merging fetch responses into the record store.

use serde_json::Value;
use tracing::warn;

use crate::geo::LatLng;
use crate::record::{Record, RecordFields, RecordId};
use crate::store::{MemoryRecordStore, RecordStore, Upsert};

/// A record whose identifier was seen for the first time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    /// Record identifier.
    pub id: RecordId,
    /// Position read from the record when it was merged.
    pub position: LatLng,
    /// The record as delivered.
    pub record: Record,
}

/// Counters for a single merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Elements in the response.
    pub received: usize,
    /// Identifiers inserted into the store.
    pub inserted: usize,
    /// Existing identifiers overwritten.
    pub replaced: usize,
    /// Elements rejected for not being objects or for missing identifier
    /// or coordinates.
    pub rejected: usize,
}

/// Records that need a marker, in response order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRecordSet {
    records: Vec<NewRecord>,
    summary: MergeSummary,
}

impl NewRecordSet {
    /// Number of new identifiers.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the merge introduced no identifiers.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over new records.
    pub fn iter(&self) -> impl Iterator<Item = &NewRecord> {
        self.records.iter()
    }

    /// Identifiers in response order.
    pub fn ids(&self) -> Vec<RecordId> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }

    /// Counters describing the merge that produced this set.
    pub fn summary(&self) -> MergeSummary {
        self.summary
    }
}

impl IntoIterator for NewRecordSet {
    type Item = NewRecord;
    type IntoIter = std::vec::IntoIter<NewRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Deduplicating record store.
///
/// Wraps a [`RecordStore`] together with the field names used to identify
/// and position records.
#[derive(Debug, Clone)]
pub struct DataStore<S = MemoryRecordStore> {
    store: S,
    fields: RecordFields,
}

impl DataStore<MemoryRecordStore> {
    /// Create a data store backed by an in-memory map.
    pub fn in_memory(fields: RecordFields) -> Self {
        Self::new(MemoryRecordStore::new(), fields)
    }
}

impl<S: RecordStore> DataStore<S> {
    /// Create a data store over an existing backend.
    pub fn new(store: S, fields: RecordFields) -> Self {
        Self { store, fields }
    }

    /// Field names in use.
    pub fn fields(&self) -> &RecordFields {
        &self.fields
    }

    /// Read access to the backend.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Look up the current record for an identifier.
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.store.get(id)
    }

    /// Number of distinct identifiers stored.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Merge a response into the store.
    ///
    /// Unknown identifiers are inserted and returned. Known identifiers are
    /// overwritten and not returned. When an identifier repeats inside one
    /// response, the first occurrence is returned and the last one is kept
    /// in the store. Elements that are not objects or lack an identifier or
    /// coordinates are rejected. `None` and empty responses leave the store
    /// untouched.
    pub fn merge(&mut self, response: Option<Vec<Value>>) -> NewRecordSet {
        let mut set = NewRecordSet::default();
        let Some(items) = response else {
            return set;
        };

        set.summary.received = items.len();
        for item in items {
            let identified = Record::from_value(item).and_then(|record| {
                let (id, position) = self.fields.identify(&record)?;
                Ok((id, position, record))
            });
            let (id, position, record) = match identified {
                Ok(identity) => identity,
                Err(e) => {
                    warn!(error = %e, "Rejected record");
                    set.summary.rejected += 1;
                    continue;
                }
            };

            match self.store.upsert(id.clone(), record.clone()) {
                Upsert::Inserted => {
                    set.summary.inserted += 1;
                    set.records.push(NewRecord {
                        id,
                        position,
                        record,
                    });
                }
                Upsert::Replaced => set.summary.replaced += 1,
            }
        }
        set
    }
}
