//! Green/red decision derivation for named circuits.

use crate::error::StoreError;
use crate::store::{DataStore, LockState, DEFAULT_THRESHOLD};

/// Pass/block decision for a circuit.
///
/// There is no intermediate state and no recovery timer: the signal is
/// derived fresh from stored counts and locks on every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Calls pass through to the protected work.
    Green,

    /// Calls are short-circuited to the fallback.
    Red,
}

impl Signal {
    /// True for [`Signal::Green`].
    pub fn is_green(&self) -> bool {
        matches!(self, Signal::Green)
    }

    /// True for [`Signal::Red`].
    pub fn is_red(&self) -> bool {
        matches!(self, Signal::Red)
    }
}

/// Derives the current signal for `name` from stored lock state, failure
/// count, and threshold.
///
/// A lock overrides the count unconditionally. Otherwise the circuit is
/// green while the failure count is strictly below the threshold; equality
/// trips it red. Pure beyond the store reads it performs.
pub fn evaluate(store: &dyn DataStore, name: &str) -> Result<Signal, StoreError> {
    match store.lock_state(name)? {
        LockState::LockedGreen => Ok(Signal::Green),
        LockState::LockedRed => Ok(Signal::Red),
        LockState::Unlocked => {
            let threshold = store.threshold(name)?.unwrap_or(DEFAULT_THRESHOLD);
            let count = store.failures(name)?.len() as u32;
            if count < threshold {
                Ok(Signal::Green)
            } else {
                Ok(Signal::Red)
            }
        }
    }
}
