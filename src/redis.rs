//! Redis-backed data store backend.

use ::redis::{Client, Commands, Connection};
use parking_lot::Mutex;

use crate::error::StoreError;
use crate::store::{DataStore, FailureRecord, LockState, MAX_RETAINED_FAILURES};

/// Namespace prefix for every key this backend touches.
const KEY_PREFIX: &str = "tripswitch";

/// [`DataStore`] backend over a shared Redis instance.
///
/// Circuit state survives process restarts and is visible to every process
/// sharing the instance. Each contract operation maps to a single Redis
/// command or a single `MULTI` transaction, so operations are individually
/// atomic; nothing coordinates across operations, and concurrent writers
/// race last-write-wins exactly as the contract allows.
///
/// Failure records are stored as a JSON-encoded list under
/// `tripswitch:{name}:failures`, most recent first (`LPUSH` order), trimmed
/// to [`MAX_RETAINED_FAILURES`] on every append. Lock state and threshold
/// are plain string keys; the set of known names lives in
/// `tripswitch:names`.
pub struct RedisStore {
    connection: Mutex<Connection>,
}

impl RedisStore {
    /// Connects to the Redis instance at `url`, e.g. `redis://127.0.0.1/`.
    pub fn open(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url).map_err(StoreError::from)?;
        let connection = client.get_connection()?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Wraps an already established connection.
    pub fn with_connection(connection: Connection) -> Self {
        Self {
            connection: Mutex::new(connection),
        }
    }

    fn key(name: &str, field: &str) -> String {
        format!("{KEY_PREFIX}:{name}:{field}")
    }

    fn names_key() -> String {
        format!("{KEY_PREFIX}:names")
    }
}

impl DataStore for RedisStore {
    fn lock_state(&self, name: &str) -> Result<LockState, StoreError> {
        let mut con = self.connection.lock();
        let stored: Option<String> = con.get(Self::key(name, "lock"))?;
        match stored {
            None => Ok(LockState::Unlocked),
            Some(value) => LockState::parse(&value).ok_or_else(|| {
                StoreError::Corrupt(format!("unknown lock state {value:?} for {name:?}"))
            }),
        }
    }

    fn set_lock_state(&self, name: &str, state: LockState) -> Result<(), StoreError> {
        let mut con = self.connection.lock();
        ::redis::pipe()
            .atomic()
            .set(Self::key(name, "lock"), state.as_str())
            .ignore()
            .sadd(Self::names_key(), name)
            .ignore()
            .query::<()>(&mut *con)?;
        Ok(())
    }

    fn failures(&self, name: &str) -> Result<Vec<FailureRecord>, StoreError> {
        let mut con = self.connection.lock();
        let raw: Vec<String> = con.lrange(Self::key(name, "failures"), 0, -1)?;
        raw.iter()
            .map(|entry| serde_json::from_str(entry).map_err(StoreError::from))
            .collect()
    }

    fn record_failure(&self, name: &str, error: &str) -> Result<u32, StoreError> {
        let encoded = serde_json::to_string(&FailureRecord::new(error))?;
        let failures_key = Self::key(name, "failures");
        let mut con = self.connection.lock();
        let (count,): (u32,) = ::redis::pipe()
            .atomic()
            .lpush(&failures_key, encoded)
            .ignore()
            .ltrim(&failures_key, 0, MAX_RETAINED_FAILURES as isize - 1)
            .ignore()
            .sadd(Self::names_key(), name)
            .ignore()
            .llen(&failures_key)
            .query(&mut *con)?;
        Ok(count)
    }

    fn clear_failures(&self, name: &str) -> Result<(), StoreError> {
        let mut con = self.connection.lock();
        let _: () = con.del(Self::key(name, "failures"))?;
        Ok(())
    }

    fn record_attempt(&self, name: &str) -> Result<(), StoreError> {
        let mut con = self.connection.lock();
        let _: u64 = con.incr(Self::key(name, "attempts"), 1u64)?;
        Ok(())
    }

    fn threshold(&self, name: &str) -> Result<Option<u32>, StoreError> {
        let mut con = self.connection.lock();
        let stored: Option<String> = con.get(Self::key(name, "threshold"))?;
        match stored {
            None => Ok(None),
            Some(value) => value.parse::<u32>().map(Some).map_err(|_| {
                StoreError::Corrupt(format!("non-numeric threshold {value:?} for {name:?}"))
            }),
        }
    }

    fn set_threshold(&self, name: &str, threshold: u32) -> Result<(), StoreError> {
        let mut con = self.connection.lock();
        ::redis::pipe()
            .atomic()
            .set(Self::key(name, "threshold"), threshold)
            .ignore()
            .sadd(Self::names_key(), name)
            .ignore()
            .query::<()>(&mut *con)?;
        Ok(())
    }

    fn names(&self) -> Result<Vec<String>, StoreError> {
        let mut con = self.connection.lock();
        Ok(con.smembers(Self::names_key())?)
    }
}
