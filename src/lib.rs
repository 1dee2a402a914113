//! # tripswitch
//!
//! Named circuit breakers with pluggable persistence: trip state lives in
//! a data store shared by every handle with the same name, across threads
//! and (with the `redis` feature) across processes.
//!
//! ## How it decides
//!
//! Each circuit is identified by a caller-chosen name. The store keeps, per
//! name, an ordered failure history, a failure threshold, and an optional
//! manual lock. On every run the signal is derived fresh from those values:
//!
//! - **Green**: the failure count is strictly below the threshold (default
//!   3). The wrapped work executes; success clears the history, an error
//!   records a failure and propagates.
//! - **Red**: the count reached the threshold. The work is skipped and the
//!   fallback's value is returned instead.
//! - A **lock** (`LockedGreen` / `LockedRed`) overrides the count in either
//!   direction until it is removed.
//!
//! There is no recovery timer and no half-open probing: a red circuit goes
//! green again when its failures are cleared, by a successful run elsewhere
//! or by an administrative [`Registry::clear_failures`].
//!
//! ## Basic usage
//!
//! ```rust
//! use tripswitch::{BreakerError, Circuit, Registry};
//! use std::error::Error;
//! use std::fmt;
//!
//! // Define a custom error type that implements the Error trait
//! #[derive(Debug)]
//! struct ServiceError(String);
//!
//! impl fmt::Display for ServiceError {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         write!(f, "Service error: {}", self.0)
//!     }
//! }
//!
//! impl Error for ServiceError {}
//!
//! // An in-memory registry; pass a RedisStore here to share state
//! // across processes.
//! let registry = Registry::memory();
//!
//! let circuit = Circuit::new(registry.clone(), "payments", || {
//!     // Your service call that might fail
//!     Ok::<_, ServiceError>("charged".to_string())
//! })
//! .with_fallback(|| "queued for retry".to_string());
//!
//! match circuit.run() {
//!     Ok(result) => println!("Call returned: {}", result),
//!     Err(BreakerError::Operation(err)) => println!("Call failed: {}", err),
//!     Err(err) => println!("Other error: {}", err),
//! }
//!
//! // Name-keyed queries work without a handle.
//! assert!(registry.is_green("payments").unwrap());
//! ```
//!
//! ## Sharing state across processes
//!
//! ```rust,ignore
//! // Enable the "redis" feature in Cargo.toml
//! use std::sync::Arc;
//! use tripswitch::{Registry, RedisStore};
//!
//! let store = RedisStore::open("redis://127.0.0.1/")?;
//! let registry = Registry::new(Arc::new(store));
//! ```
//!
//! ## Features
//!
//! - `redis` - Redis-backed store for cross-process circuit state

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod circuit;
mod error;
mod memory;
pub mod prelude;
#[cfg(feature = "redis")]
#[cfg_attr(docsrs, doc(cfg(feature = "redis")))]
mod redis;
mod registry;
mod state;
mod store;

// Re-exports
pub use circuit::Circuit;
pub use error::{BreakerError, BreakerResult, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "redis")]
#[cfg_attr(docsrs, doc(cfg(feature = "redis")))]
pub use redis::RedisStore;
pub use registry::Registry;
pub use state::{evaluate, Signal};
pub use store::{DataStore, FailureRecord, LockState, DEFAULT_THRESHOLD, MAX_RETAINED_FAILURES};
