//! The breaker handle: binds a name and a unit of work to a registry.

use tracing::{debug, warn};

use crate::error::{BreakerError, BreakerResult, StoreError};
use crate::registry::Registry;

type Work<T, E> = Box<dyn Fn() -> Result<T, E> + Send + Sync>;
type Fallback<T> = Box<dyn Fn() -> T + Send + Sync>;
type AllowedPredicate<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

/// A named circuit wrapping one unit of work.
///
/// The name, not the handle, is the unit of identity: two handles built
/// with the same name against the same registry share lock state, failure
/// count, and threshold transparently. The handle itself only holds the
/// work, the optional fallback, the allowed-error predicate, and the
/// threshold it synchronizes into the store on every [`Circuit::run`].
pub struct Circuit<T, E> {
    name: String,
    registry: Registry,
    code: Work<T, E>,
    fallback: Option<Fallback<T>>,
    allowed: Option<AllowedPredicate<E>>,
    threshold: Option<u32>,
}

impl<T, E> Circuit<T, E>
where
    E: std::error::Error + 'static,
{
    /// Creates a circuit named `name` wrapping `code`, backed by
    /// `registry`.
    pub fn new<F>(registry: Registry, name: impl Into<String>, code: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            registry,
            code: Box::new(code),
            fallback: None,
            allowed: None,
            threshold: None,
        }
    }

    /// Sets the predicate deciding which errors do not count toward
    /// tripping the circuit. Replaces, not merges, any prior predicate.
    ///
    /// An allowed error still propagates to the caller; it clears the
    /// failure count instead of incrementing it.
    pub fn with_allowed_errors<F>(mut self, allowed: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.allowed = Some(Box::new(allowed));
        self
    }

    /// Sets the fallback invoked on the short-circuit path. Replaces any
    /// prior fallback.
    pub fn with_fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.fallback = Some(Box::new(fallback));
        self
    }

    /// Sets the failure threshold for this circuit's name.
    ///
    /// The value is written to the store immediately, so it changes the
    /// decision for every handle sharing the name before `run` is ever
    /// called, and it is re-synchronized on each run (last writer wins
    /// across handles).
    pub fn with_threshold(mut self, threshold: u32) -> Result<Self, StoreError> {
        self.registry.store().set_threshold(&self.name, threshold)?;
        self.threshold = Some(threshold);
        Ok(self)
    }

    /// The circuit's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this circuit currently passes calls through.
    pub fn is_green(&self) -> Result<bool, StoreError> {
        self.registry.is_green(&self.name)
    }

    /// Whether this circuit currently short-circuits.
    pub fn is_red(&self) -> Result<bool, StoreError> {
        self.registry.is_red(&self.name)
    }

    /// Effective failure threshold for this circuit's name.
    pub fn threshold(&self) -> Result<u32, StoreError> {
        self.registry.threshold(&self.name)
    }

    /// Runs the wrapped work, or the fallback when the circuit is red.
    ///
    /// On green the work executes: success clears the failure history,
    /// an error records a failure (or clears, when the allowed predicate
    /// accepts it) and then propagates as [`BreakerError::Operation`] —
    /// `run` never converts the current call's own failure into a fallback
    /// result. On red an attempt is recorded and the fallback's value is
    /// returned; [`BreakerError::NoFallback`] if none was configured.
    ///
    /// Store errors propagate as [`BreakerError::Store`]: an unreachable
    /// store fails the circuit check itself rather than silently falling
    /// back. Callers wanting fallback-on-store-failure must wrap
    /// accordingly.
    pub fn run(&self) -> BreakerResult<T, E> {
        self.sync_settings()?;

        if self.registry.is_green(&self.name)? {
            self.run_code()
        } else {
            self.run_fallback()
        }
    }

    fn run_code(&self) -> BreakerResult<T, E> {
        match (self.code)() {
            Ok(result) => {
                self.registry.store().clear_failures(&self.name)?;
                Ok(result)
            }
            Err(error) => {
                if self.error_allowed(&error) {
                    debug!(circuit = %self.name, %error, "allowed error, clearing failures");
                    self.registry.store().clear_failures(&self.name)?;
                } else {
                    let count = self
                        .registry
                        .store()
                        .record_failure(&self.name, &error.to_string())?;
                    debug!(circuit = %self.name, %error, failures = count, "recorded failure");
                }
                Err(BreakerError::Operation(error))
            }
        }
    }

    fn run_fallback(&self) -> BreakerResult<T, E> {
        self.registry.store().record_attempt(&self.name)?;
        warn!(circuit = %self.name, "circuit is red, short-circuiting");
        match &self.fallback {
            Some(fallback) => Ok(fallback()),
            None => Err(BreakerError::NoFallback),
        }
    }

    fn error_allowed(&self, error: &E) -> bool {
        self.allowed.as_ref().is_some_and(|allowed| allowed(error))
    }

    /// Writes this handle's threshold into the store: the configured value,
    /// or the currently effective one when never configured.
    fn sync_settings(&self) -> Result<(), StoreError> {
        let threshold = match self.threshold {
            Some(configured) => configured,
            None => self.registry.threshold(&self.name)?,
        };
        self.registry.store().set_threshold(&self.name, threshold)
    }
}
