//! Bounded fixed-delay retry for downstream calls.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::utils::error::{ClientFault, ErrorKind};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_FIXED_DELAY: Duration = Duration::from_secs(1);

/// Immutable retry policy, shared read-only between concurrent calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    fixed_delay: Duration,
    retryable: HashSet<ErrorKind>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_FIXED_DELAY)
    }
}

impl RetryPolicy {
    /// Policy that retries server errors only. `max_attempts` counts the
    /// first call and is clamped to at least one.
    pub fn new(max_attempts: u32, fixed_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            fixed_delay,
            retryable: HashSet::from([ErrorKind::ServerError]),
        }
    }

    pub fn with_retryable(mut self, kind: ErrorKind) -> Self {
        self.retryable.insert(kind);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn fixed_delay(&self) -> Duration {
        self.fixed_delay
    }

    pub fn is_retryable(&self, fault: &ClientFault) -> bool {
        !fault.is_exhausted() && self.retryable.contains(&fault.kind())
    }

    /// Runs `operation` until it succeeds, fails with a fault outside the
    /// retryable set, or `max_attempts` calls have been made. Exhaustion
    /// wraps the last fault in `ClientFault::RetryExhausted`.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, ClientFault>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ClientFault>>,
    {
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("Call succeeded on attempt {}/{}", attempt, self.max_attempts);
                    }
                    return Ok(value);
                }
                Err(fault) if !self.is_retryable(&fault) => {
                    debug!("Non-retryable fault: {}", fault);
                    return Err(fault);
                }
                Err(fault) if attempt >= self.max_attempts => {
                    warn!("Giving up after {} attempts: {}", attempt, fault);
                    return Err(ClientFault::RetryExhausted {
                        attempts: attempt,
                        last: Box::new(fault),
                    });
                }
                Err(fault) => {
                    warn!(
                        "Call failed (attempt {}/{}), retrying in {:?}: {}",
                        attempt, self.max_attempts, self.fixed_delay, fault
                    );
                    tokio::time::sleep(self.fixed_delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
