//! Identifier-keyed record storage
//!
//! The store is the only place records live once they have been fetched.
//! It is append-or-overwrite: keys are never removed for the lifetime of a
//! layer.
//!
//! # Example
//!
//! ```ignore
//! use geoloader::store::{MemoryRecordStore, RecordStore, Upsert};
//!
//! let mut store = MemoryRecordStore::new();
//! assert_eq!(store.upsert(id.clone(), record), Upsert::Inserted);
//! assert!(store.get(&id).is_some());
//! ```

mod memory;
mod traits;

pub use memory::MemoryRecordStore;
pub use traits::{RecordStore, Upsert};
