use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tripswitch::{BreakerError, Circuit, Registry};

// Custom error type that implements Error trait
#[derive(Debug)]
struct ServiceError(String);

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service error: {}", self.0)
    }
}

impl Error for ServiceError {}

fn main() {
    let registry = Registry::memory();

    // Simulate a flaky service: the first 5 calls fail, then it recovers.
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let call_service = move || -> Result<String, ServiceError> {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= 5 {
            Err(ServiceError(format!("external service error #{n}")))
        } else {
            Ok("Success".to_string())
        }
    };

    let circuit = Circuit::new(registry.clone(), "svc", call_service)
        .with_fallback(|| "Fallback result".to_string());

    println!(
        "Circuit starts green: {}",
        registry.is_green("svc").unwrap()
    );

    // The default threshold is 3, so the circuit trips after three failures
    // and every call after that is short-circuited to the fallback.
    for i in 1..=6 {
        print!("Attempt {}: ", i);
        match circuit.run() {
            Ok(result) => println!("returned {:?}", result),
            Err(BreakerError::Operation(err)) => println!("failed ({})", err),
            Err(err) => println!("breaker error ({})", err),
        }
    }

    println!(
        "\nCircuit is now red: {} (failures: {})",
        registry.is_red("svc").unwrap(),
        registry.store().failures("svc").unwrap().len()
    );

    // Clearing the failure history lets calls through again; by now the
    // simulated service has recovered.
    registry.clear_failures("svc").unwrap();
    println!("\nAfter clearing failures:");
    match circuit.run() {
        Ok(result) => println!("returned {:?}", result),
        Err(err) => println!("error ({})", err),
    }

    // A manual lock overrides the count in either direction.
    registry.lock_red("svc").unwrap();
    println!("\nLocked red: run returns {:?}", circuit.run().unwrap());
    registry.unlock("svc").unwrap();
    println!("Unlocked: run returns {:?}", circuit.run().unwrap());
}
