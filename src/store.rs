//! The persistence contract shared by all circuit state backends.

use std::time::SystemTime;

use crate::error::StoreError;

/// Failure count at or above which a circuit trips when no threshold has
/// been stored for its name.
pub const DEFAULT_THRESHOLD: u32 = 3;

/// Maximum number of failure records a backend retains per name.
///
/// Backends keep the most recent records up to this cap, so the count used
/// for threshold comparison saturates here. Thresholds above the cap are
/// out of contract.
pub const MAX_RETAINED_FAILURES: usize = 100;

/// Manual override of a circuit's pass/block decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockState {
    /// No override; the decision comes from the failure count.
    #[default]
    Unlocked,

    /// Force the circuit green regardless of recorded failures.
    LockedGreen,

    /// Force the circuit red regardless of recorded failures.
    LockedRed,
}

impl LockState {
    /// Stable string form, used by backends that persist the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            LockState::Unlocked => "unlocked",
            LockState::LockedGreen => "locked_green",
            LockState::LockedRed => "locked_red",
        }
    }

    /// Parses the form produced by [`LockState::as_str`].
    pub fn parse(value: &str) -> Option<LockState> {
        match value {
            "unlocked" => Some(LockState::Unlocked),
            "locked_green" => Some(LockState::LockedGreen),
            "locked_red" => Some(LockState::LockedRed),
            _ => None,
        }
    }
}

/// A single recorded failure for a named circuit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "redis", derive(serde::Serialize, serde::Deserialize))]
pub struct FailureRecord {
    /// Description of the error that caused the failure.
    pub error: String,

    /// When the failure was recorded.
    pub recorded_at: SystemTime,
}

impl FailureRecord {
    /// Creates a record for `error`, timestamped now.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            recorded_at: SystemTime::now(),
        }
    }
}

/// Persistent, shared record of failures, threshold, and lock state per
/// named circuit.
///
/// All operations are keyed by circuit name. Per-name state is created
/// lazily on first write and never destroyed by the core; clearing
/// failures is the only administrative reset this contract exposes.
///
/// Implementations must keep each individual operation safe under
/// concurrent callers. Nothing coordinates *across* operations: two
/// callers may interleave an evaluate with a record, and the last writer
/// wins on overwrites. That race is part of the design, not something a
/// backend should try to close.
pub trait DataStore: Send + Sync {
    /// Returns the manual override for `name`, `Unlocked` if never set.
    fn lock_state(&self, name: &str) -> Result<LockState, StoreError>;

    /// Overwrites the manual override for `name`. Idempotent.
    fn set_lock_state(&self, name: &str, state: LockState) -> Result<(), StoreError>;

    /// Returns the retained failure records for `name`, most recent first.
    /// Empty if none were ever recorded.
    fn failures(&self, name: &str) -> Result<Vec<FailureRecord>, StoreError>;

    /// Appends a failure record for `name` and returns the current failure
    /// count used for threshold comparison. Retention is capped at
    /// [`MAX_RETAINED_FAILURES`] and the count saturates at the cap.
    fn record_failure(&self, name: &str, error: &str) -> Result<u32, StoreError>;

    /// Removes all failure records for `name`.
    fn clear_failures(&self, name: &str) -> Result<(), StoreError>;

    /// Bookkeeping hook for a short-circuited call. Does not affect the
    /// pass/block decision; backends may no-op.
    fn record_attempt(&self, name: &str) -> Result<(), StoreError>;

    /// Returns the stored threshold for `name`, if one was ever set.
    fn threshold(&self, name: &str) -> Result<Option<u32>, StoreError>;

    /// Stores the failure threshold for `name`.
    fn set_threshold(&self, name: &str, threshold: u32) -> Result<(), StoreError>;

    /// Returns every name with any recorded state, in no particular order.
    fn names(&self) -> Result<Vec<String>, StoreError>;
}
