//! In-memory registry backend.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::core::{EngineError, ProcessRecord, ProcessRegistry, RecordHandle};

/// Registry backed by a `HashMap` of per-record mutexes.
///
/// The map lock is held only while looking up, inserting, removing, or
/// snapshotting handles, never while a record is being mutated.
#[derive(Default)]
pub struct InMemoryRegistry {
    records: RwLock<HashMap<String, RecordHandle>>,
}

impl InMemoryRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with room for `capacity` records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: RwLock::new(HashMap::with_capacity(capacity)),
        }
    }
}

impl ProcessRegistry for InMemoryRegistry {
    fn insert(&self, record: ProcessRecord) -> Result<RecordHandle, EngineError> {
        let mut records = self.records.write();
        if records.contains_key(&record.process_id) {
            return Err(EngineError::Validation(format!(
                "Process id already registered: {}",
                record.process_id
            )));
        }
        let id = record.process_id.clone();
        let handle = Arc::new(Mutex::new(record));
        records.insert(id, Arc::clone(&handle));
        Ok(handle)
    }

    fn get(&self, id: &str) -> Option<RecordHandle> {
        self.records.read().get(id).cloned()
    }

    fn remove(&self, id: &str) -> Option<RecordHandle> {
        self.records.write().remove(id)
    }

    fn handles(&self) -> Vec<RecordHandle> {
        self.records.read().values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.records.read().len()
    }
}
