//! Error types for the circuit breaker library.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Result type for a circuit run.
pub type BreakerResult<T, E> = Result<T, BreakerError<E>>;

/// Error type for circuit operations.
#[derive(Debug)]
pub enum BreakerError<E> {
    /// The circuit was red and no fallback was configured.
    NoFallback,

    /// A data store operation failed.
    ///
    /// The core performs no retry and no fallback substitution on this
    /// class of error; an unreachable store fails the circuit check itself.
    Store(StoreError),

    /// The wrapped work failed. Failure bookkeeping has already been
    /// recorded by the time this is returned.
    Operation(E),
}

/// Error from a data store backend.
#[derive(Debug)]
pub enum StoreError {
    /// The backend could not be reached or the operation did not complete.
    Unavailable(String),

    /// The backend returned a stored value this crate could not decode.
    Corrupt(String),
}

impl<E> Display for BreakerError<E>
where
    E: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            BreakerError::NoFallback => {
                write!(f, "Circuit is red and no fallback is configured")
            }
            BreakerError::Store(e) => write!(f, "Data store error: {}", e),
            BreakerError::Operation(e) => write!(f, "Operation error: {}", e),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "Data store unavailable: {}", msg),
            StoreError::Corrupt(msg) => write!(f, "Corrupt stored value: {}", msg),
        }
    }
}

impl<E: Error + 'static> Error for BreakerError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BreakerError::NoFallback => None,
            BreakerError::Store(e) => Some(e),
            BreakerError::Operation(e) => Some(e),
        }
    }
}

impl Error for StoreError {}

impl<E> From<StoreError> for BreakerError<E> {
    fn from(error: StoreError) -> Self {
        BreakerError::Store(error)
    }
}

#[cfg(feature = "redis")]
impl From<::redis::RedisError> for StoreError {
    fn from(error: ::redis::RedisError) -> Self {
        StoreError::Unavailable(error.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        StoreError::Corrupt(error.to_string())
    }
}
