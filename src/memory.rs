//! In-process data store backend.

use std::collections::HashMap;

use ahash::RandomState;
use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::error::StoreError;
use crate::store::{DataStore, FailureRecord, LockState, MAX_RETAINED_FAILURES};

/// Stored state for one circuit name.
#[derive(Debug, Default)]
struct CircuitRecord {
    lock: LockState,
    failures: SmallVec<[FailureRecord; 4]>,
    threshold: Option<u32>,
    attempts: u64,
}

/// Volatile, process-local [`DataStore`] backend.
///
/// State lives for the lifetime of the process and is shared by every
/// handle holding the same instance. A single `RwLock` guards the name
/// map, which makes each contract operation atomic within the process;
/// the evaluate-then-record sequence performed by callers is not.
#[derive(Debug, Default)]
pub struct MemoryStore {
    circuits: RwLock<HashMap<String, CircuitRecord, RandomState>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of short-circuited attempts recorded for `name`.
    pub fn attempts(&self, name: &str) -> u64 {
        self.circuits.read().get(name).map_or(0, |c| c.attempts)
    }

    fn with_record<R>(&self, name: &str, f: impl FnOnce(&mut CircuitRecord) -> R) -> R {
        let mut circuits = self.circuits.write();
        f(circuits.entry(name.to_owned()).or_default())
    }
}

impl DataStore for MemoryStore {
    fn lock_state(&self, name: &str) -> Result<LockState, StoreError> {
        Ok(self
            .circuits
            .read()
            .get(name)
            .map_or(LockState::Unlocked, |c| c.lock))
    }

    fn set_lock_state(&self, name: &str, state: LockState) -> Result<(), StoreError> {
        self.with_record(name, |c| c.lock = state);
        Ok(())
    }

    fn failures(&self, name: &str) -> Result<Vec<FailureRecord>, StoreError> {
        Ok(self
            .circuits
            .read()
            .get(name)
            .map_or_else(Vec::new, |c| c.failures.to_vec()))
    }

    fn record_failure(&self, name: &str, error: &str) -> Result<u32, StoreError> {
        Ok(self.with_record(name, |c| {
            // Most recent first, same order the Redis backend keeps.
            c.failures.insert(0, FailureRecord::new(error));
            c.failures.truncate(MAX_RETAINED_FAILURES);
            c.failures.len() as u32
        }))
    }

    fn clear_failures(&self, name: &str) -> Result<(), StoreError> {
        if let Some(record) = self.circuits.write().get_mut(name) {
            record.failures.clear();
        }
        Ok(())
    }

    fn record_attempt(&self, name: &str) -> Result<(), StoreError> {
        self.with_record(name, |c| c.attempts += 1);
        Ok(())
    }

    fn threshold(&self, name: &str) -> Result<Option<u32>, StoreError> {
        Ok(self.circuits.read().get(name).and_then(|c| c.threshold))
    }

    fn set_threshold(&self, name: &str, threshold: u32) -> Result<(), StoreError> {
        self.with_record(name, |c| c.threshold = Some(threshold));
        Ok(())
    }

    fn names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.circuits.read().keys().cloned().collect())
    }
}
