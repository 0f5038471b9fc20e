//! BackoffGate - shared strike counter for endpoint retirement

use std::sync::atomic::{AtomicU32, Ordering};

use contracts::ContractError;

/// Strike counter guarding one endpoint
///
/// Endpoints call `check` before I/O, `strike` after a connection-class
/// failure, and `reset` after any success. Once the strike count reaches the
/// threshold, `check` returns [`ContractError::BackoffExceeded`] and the
/// endpoint is permanently retired by its engine.
#[derive(Debug)]
pub struct BackoffGate {
    endpoint: String,
    threshold: u32,
    strikes: AtomicU32,
}

impl BackoffGate {
    pub fn new(endpoint: impl Into<String>, threshold: u32) -> Self {
        Self {
            endpoint: endpoint.into(),
            threshold,
            strikes: AtomicU32::new(0),
        }
    }

    /// Fails with the retirement signal once the threshold has been reached
    pub fn check(&self) -> Result<(), ContractError> {
        let strikes = self.strikes.load(Ordering::Relaxed);
        if strikes >= self.threshold {
            return Err(ContractError::backoff_exceeded(&self.endpoint, strikes));
        }
        Ok(())
    }

    /// Count one connection-class failure, returning the new total
    pub fn strike(&self) -> u32 {
        self.strikes.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Clear the counter after a successful call
    pub fn reset(&self) {
        self.strikes.store(0, Ordering::Relaxed);
    }

    pub fn strikes(&self) -> u32 {
        self.strikes.load(Ordering::Relaxed)
    }
}
