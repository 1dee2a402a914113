//! Re-exports common types for convenient usage.
//!
//! # Example
//! ```rust,no_run
//! use tripswitch::prelude::*;
//! ```

pub use crate::circuit::Circuit;
pub use crate::error::{BreakerError, BreakerResult, StoreError};
pub use crate::memory::MemoryStore;
#[cfg(feature = "redis")]
pub use crate::redis::RedisStore;
pub use crate::registry::Registry;
pub use crate::state::{evaluate, Signal};
pub use crate::store::{DataStore, FailureRecord, LockState, DEFAULT_THRESHOLD};
