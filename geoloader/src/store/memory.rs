//! In-memory record store backed by a `HashMap`.

use std::collections::HashMap;

use super::traits::{RecordStore, Upsert};
use crate::record::{Record, RecordId};

/// In-memory record store.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: HashMap<RecordId, Record>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.get(id)
    }

    fn upsert(&mut self, id: RecordId, record: Record) -> Upsert {
        match self.records.insert(id, record) {
            Some(_) => Upsert::Replaced,
            None => Upsert::Inserted,
        }
    }

    fn keys(&self) -> Vec<RecordId> {
        self.records.keys().cloned().collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
