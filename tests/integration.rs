use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tripswitch::{BreakerError, Circuit, MemoryStore, Registry, DEFAULT_THRESHOLD};

// Custom error type that implements Error trait
#[derive(Debug)]
struct TestError(String);

impl TestError {
    fn new(msg: &str) -> Self {
        TestError(msg.to_string())
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Test error: {}", self.0)
    }
}

impl Error for TestError {}

#[test]
fn test_successful_run_clears_failures() {
    let registry = Registry::memory();
    registry.store().record_failure("svc", "earlier").unwrap();
    registry.store().record_failure("svc", "earlier").unwrap();

    let circuit = Circuit::new(registry.clone(), "svc", || {
        Ok::<_, TestError>("success".to_string())
    });

    let result = circuit.run();
    assert_eq!(result.unwrap(), "success");
    assert!(registry.store().failures("svc").unwrap().is_empty());

    // Idempotent: a second success leaves the history empty too.
    assert!(circuit.run().is_ok());
    assert!(registry.store().failures("svc").unwrap().is_empty());
}

#[test]
fn test_failure_is_recorded_and_propagated() {
    let registry = Registry::memory();
    let circuit = Circuit::new(registry.clone(), "svc", || {
        Err::<String, _>(TestError::new("boom"))
    });

    let result = circuit.run();
    assert!(matches!(result.unwrap_err(), BreakerError::Operation(_)));
    assert_eq!(registry.store().failures("svc").unwrap().len(), 1);

    let result = circuit.run();
    assert!(matches!(result.unwrap_err(), BreakerError::Operation(_)));
    let failures = registry.store().failures("svc").unwrap();
    assert_eq!(failures.len(), 2);
    assert!(failures[0].error.contains("boom"));
}

#[test]
fn test_allowed_error_clears_failures_and_still_propagates() {
    let registry = Registry::memory();
    registry.store().record_failure("svc", "earlier").unwrap();
    registry.store().record_failure("svc", "earlier").unwrap();

    let circuit = Circuit::new(registry.clone(), "svc", || {
        Err::<String, _>(TestError::new("expected validation error"))
    })
    .with_allowed_errors(|e: &TestError| e.0.contains("validation"));

    let result = circuit.run();
    assert!(matches!(result.unwrap_err(), BreakerError::Operation(_)));
    assert!(registry.store().failures("svc").unwrap().is_empty());
}

#[test]
fn test_error_outside_allowed_predicate_still_counts() {
    let registry = Registry::memory();
    let circuit = Circuit::new(registry.clone(), "svc", || {
        Err::<String, _>(TestError::new("connection reset"))
    })
    .with_allowed_errors(|e: &TestError| e.0.contains("validation"));

    let result = circuit.run();
    assert!(matches!(result.unwrap_err(), BreakerError::Operation(_)));
    assert_eq!(registry.store().failures("svc").unwrap().len(), 1);
}

#[test]
fn test_trips_at_default_threshold_and_recovers_on_clear() {
    let registry = Registry::memory();
    let circuit = Circuit::new(registry.clone(), "svc", || {
        Err::<String, _>(TestError::new("boom"))
    });

    for _ in 0..DEFAULT_THRESHOLD {
        let _ = circuit.run();
    }

    assert!(!registry.is_green("svc").unwrap());
    assert!(circuit.is_red().unwrap());

    registry.clear_failures("svc").unwrap();
    assert!(registry.is_green("svc").unwrap());
}

#[test]
fn test_locked_red_overrides_zero_failures() {
    let registry = Registry::memory();
    registry.lock_red("svc").unwrap();

    assert!(registry.store().failures("svc").unwrap().is_empty());
    assert!(!registry.is_green("svc").unwrap());

    registry.unlock("svc").unwrap();
    assert!(registry.is_green("svc").unwrap());
}

#[test]
fn test_locked_green_overrides_failure_count() {
    let registry = Registry::memory();
    for _ in 0..10 {
        registry.store().record_failure("svc", "boom").unwrap();
    }
    assert!(registry.is_red("svc").unwrap());

    registry.lock_green("svc").unwrap();
    assert!(registry.is_green("svc").unwrap());
}

#[test]
fn test_short_circuit_returns_fallback_without_executing_code() {
    let registry = Registry::memory();
    registry.lock_red("svc").unwrap();

    let calls = Arc::new(AtomicU32::new(0));
    let counted = Arc::clone(&calls);
    let circuit = Circuit::new(registry.clone(), "svc", move || {
        counted.fetch_add(1, Ordering::SeqCst);
        Ok::<_, TestError>("live".to_string())
    })
    .with_fallback(|| "fallback".to_string());

    assert_eq!(circuit.run().unwrap(), "fallback");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_no_fallback_fails_and_records_attempt() {
    let store = Arc::new(MemoryStore::new());
    let registry = Registry::new(store.clone());
    registry.lock_red("svc").unwrap();

    let circuit = Circuit::new(registry, "svc", || Ok::<_, TestError>("live".to_string()));

    let result = circuit.run();
    assert!(matches!(result.unwrap_err(), BreakerError::NoFallback));
    assert_eq!(store.attempts("svc"), 1);
}

#[test]
fn test_fallback_is_never_used_for_the_failing_call_itself() {
    let registry = Registry::memory();
    let circuit = Circuit::new(registry, "svc", || {
        Err::<String, _>(TestError::new("boom"))
    })
    .with_fallback(|| "fallback".to_string());

    // Green path: the call's own failure propagates, it does not fall back.
    let result = circuit.run();
    assert!(matches!(result.unwrap_err(), BreakerError::Operation(_)));
}

#[test]
fn test_threshold_round_trip_through_registry() {
    let registry = Registry::memory();
    let circuit = Circuit::new(registry.clone(), "svc", || {
        Ok::<_, TestError>("success".to_string())
    })
    .with_threshold(5)
    .unwrap();

    // Visible to every handle sharing the name before run is ever called.
    assert_eq!(registry.threshold("svc").unwrap(), 5);
    assert_eq!(circuit.threshold().unwrap(), 5);
}

#[test]
fn test_configured_threshold_changes_the_trip_point() {
    let registry = Registry::memory();
    let _circuit = Circuit::new(registry.clone(), "svc", || {
        Ok::<_, TestError>("success".to_string())
    })
    .with_threshold(1)
    .unwrap();

    assert!(registry.is_green("svc").unwrap());
    registry.store().record_failure("svc", "boom").unwrap();
    assert!(registry.is_red("svc").unwrap());
}

#[test]
fn test_run_resynchronizes_configured_threshold() {
    let registry = Registry::memory();
    let circuit = Circuit::new(registry.clone(), "svc", || {
        Ok::<_, TestError>("success".to_string())
    })
    .with_threshold(5)
    .unwrap();

    // Another writer lowers the stored threshold out from under the handle.
    registry.store().set_threshold("svc", 1).unwrap();
    assert_eq!(registry.threshold("svc").unwrap(), 1);

    // The next run writes the handle's configured value back (last writer
    // wins across handles).
    circuit.run().unwrap();
    assert_eq!(registry.threshold("svc").unwrap(), 5);
}

#[test]
fn test_handles_share_state_by_name() {
    let registry = Registry::memory();
    let failing = Circuit::new(registry.clone(), "svc", || {
        Err::<String, _>(TestError::new("boom"))
    });
    let observing = Circuit::new(registry.clone(), "svc", || {
        Ok::<_, TestError>("success".to_string())
    })
    .with_fallback(|| "fallback".to_string());

    for _ in 0..DEFAULT_THRESHOLD {
        let _ = failing.run();
    }

    // Same name, same state: the other handle short-circuits.
    assert!(observing.is_red().unwrap());
    assert_eq!(observing.run().unwrap(), "fallback");
}

#[test]
fn test_distinct_names_are_independent() {
    let registry = Registry::memory();
    let failing = Circuit::new(registry.clone(), "svc-a", || {
        Err::<String, _>(TestError::new("boom"))
    });

    for _ in 0..DEFAULT_THRESHOLD {
        let _ = failing.run();
    }

    assert!(registry.is_red("svc-a").unwrap());
    assert!(registry.is_green("svc-b").unwrap());
}

mod evaluate_properties {
    use proptest::prelude::*;
    use tripswitch::{evaluate, DataStore, LockState, MemoryStore, Signal};

    proptest! {
        #[test]
        fn unlocked_is_green_iff_count_below_threshold(
            count in 0u32..20,
            threshold in 1u32..20,
        ) {
            let store = MemoryStore::new();
            store.set_threshold("svc", threshold).unwrap();
            for _ in 0..count {
                store.record_failure("svc", "boom").unwrap();
            }

            let signal = evaluate(&store, "svc").unwrap();
            prop_assert_eq!(signal == Signal::Green, count < threshold);
        }

        #[test]
        fn locks_override_any_count(count in 0u32..20) {
            let store = MemoryStore::new();
            for _ in 0..count {
                store.record_failure("svc", "boom").unwrap();
            }

            store.set_lock_state("svc", LockState::LockedGreen).unwrap();
            prop_assert_eq!(evaluate(&store, "svc").unwrap(), Signal::Green);

            store.set_lock_state("svc", LockState::LockedRed).unwrap();
            prop_assert_eq!(evaluate(&store, "svc").unwrap(), Signal::Red);
        }

        #[test]
        fn count_equal_to_threshold_is_red(threshold in 1u32..20) {
            let store = MemoryStore::new();
            store.set_threshold("svc", threshold).unwrap();
            for _ in 0..threshold {
                store.record_failure("svc", "boom").unwrap();
            }

            prop_assert_eq!(evaluate(&store, "svc").unwrap(), Signal::Red);
        }
    }
}
