//! Name-keyed queries and administrative controls over a shared store.

use std::sync::Arc;

use crate::error::StoreError;
use crate::memory::MemoryStore;
use crate::state::{self, Signal};
use crate::store::{DataStore, LockState, DEFAULT_THRESHOLD};

/// Handle to the data store backing a set of named circuits.
///
/// A registry is an explicit value passed into each [`Circuit`], not
/// process-global state; tests get isolation by building one registry per
/// test. Cloning is cheap and every clone shares the same backend.
///
/// [`Circuit`]: crate::Circuit
#[derive(Clone)]
pub struct Registry {
    store: Arc<dyn DataStore>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::memory()
    }
}

impl Registry {
    /// Creates a registry over `store`.
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Creates a registry over a fresh in-memory store.
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// The underlying data store.
    pub fn store(&self) -> &Arc<dyn DataStore> {
        &self.store
    }

    /// Whether calls through circuits named `name` currently pass.
    pub fn is_green(&self, name: &str) -> Result<bool, StoreError> {
        Ok(state::evaluate(self.store.as_ref(), name)?.is_green())
    }

    /// Whether calls through circuits named `name` currently short-circuit.
    pub fn is_red(&self, name: &str) -> Result<bool, StoreError> {
        self.is_green(name).map(|green| !green)
    }

    /// Current signal for `name`.
    pub fn signal(&self, name: &str) -> Result<Signal, StoreError> {
        state::evaluate(self.store.as_ref(), name)
    }

    /// Effective failure threshold for `name`: the stored value, or
    /// [`DEFAULT_THRESHOLD`] when none was ever set.
    pub fn threshold(&self, name: &str) -> Result<u32, StoreError> {
        Ok(self.store.threshold(name)?.unwrap_or(DEFAULT_THRESHOLD))
    }

    /// Every name with any recorded state.
    pub fn names(&self) -> Result<Vec<String>, StoreError> {
        self.store.names()
    }

    /// Forces `name` green until [`Registry::unlock`], bypassing the
    /// failure count.
    pub fn lock_green(&self, name: &str) -> Result<(), StoreError> {
        self.store.set_lock_state(name, LockState::LockedGreen)
    }

    /// Forces `name` red until [`Registry::unlock`], bypassing the failure
    /// count.
    pub fn lock_red(&self, name: &str) -> Result<(), StoreError> {
        self.store.set_lock_state(name, LockState::LockedRed)
    }

    /// Returns `name` to count-based evaluation.
    pub fn unlock(&self, name: &str) -> Result<(), StoreError> {
        self.store.set_lock_state(name, LockState::Unlocked)
    }

    /// Discards all recorded failures for `name`.
    pub fn clear_failures(&self, name: &str) -> Result<(), StoreError> {
        self.store.clear_failures(name)
    }
}
