//! Registry abstraction over the live process records.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::record::ProcessRecord;
use crate::core::EngineError;

/// Shared handle to a single record. Holding the lock grants exclusive
/// mutation access to that record only.
pub type RecordHandle = Arc<Mutex<ProcessRecord>>;

/// Abstraction for registry backends keyed by process id.
///
/// Implementations only guard the id → handle mapping; per-record exclusion is
/// provided by the handle's own mutex.
pub trait ProcessRegistry: Send + Sync {
    /// Insert a new record. Fails if the id is already present.
    fn insert(&self, record: ProcessRecord) -> Result<RecordHandle, EngineError>;
    /// Look up the handle for `id`.
    fn get(&self, id: &str) -> Option<RecordHandle>;
    /// Remove and return the handle for `id`.
    fn remove(&self, id: &str) -> Option<RecordHandle>;
    /// Snapshot of all handles currently present, in no particular order.
    fn handles(&self) -> Vec<RecordHandle>;
    /// Number of records present.
    fn len(&self) -> usize;
    /// Whether the registry holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run `f` against the live record `id` while holding its lock.
///
/// A record removed between lookup and locking is reported as not found, so
/// a concurrent deletion can never be undone by a late update.
///
/// # Errors
///
/// [`EngineError::NotFound`] if `id` is absent or already terminated.
pub fn with_live<G, F, T>(registry: &G, id: &str, f: F) -> Result<T, EngineError>
where
    G: ProcessRegistry + ?Sized,
    F: FnOnce(&mut ProcessRecord) -> T,
{
    let handle = registry
        .get(id)
        .ok_or_else(|| EngineError::NotFound(id.to_string()))?;
    let mut record = handle.lock();
    if !record.is_live() {
        return Err(EngineError::NotFound(id.to_string()));
    }
    Ok(f(&mut record))
}
