//! Bounded retry for ledger transactions.
//!
//! PostgreSQL aborts a transaction with SQLSTATE `40001` (serialization
//! failure) or `40P01` (deadlock detected) when concurrent writers collide.
//! Such attempts are rolled back entirely and can be re-run from scratch.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::domain::donation::LedgerError;

const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// How often and how patiently a conflicting transaction is re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(25),
            max_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff before re-running after failed attempt number `attempt` (1-based):
    /// `base`, `2 * base`, `4 * base`, ... capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

/// Outcome of one transaction attempt.
#[derive(Debug)]
pub(super) enum AttemptError {
    /// Rolled back by a concurrent writer; safe to re-run.
    Conflict(String),
    /// Anything else; surfaced to the caller unchanged.
    Fatal(LedgerError),
}

impl From<LedgerError> for AttemptError {
    fn from(err: LedgerError) -> Self {
        AttemptError::Fatal(err)
    }
}

/// Maps a sqlx error, separating retryable conflicts from real failures.
pub(super) fn classify(context: &str, err: sqlx::Error) -> AttemptError {
    if let sqlx::Error::Database(db_err) = &err {
        if matches!(
            db_err.code().as_deref(),
            Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED)
        ) {
            return AttemptError::Conflict(format!("{}: {}", context, db_err.message()));
        }
    }
    AttemptError::Fatal(LedgerError::storage(format!("{}: {}", context, err)))
}

/// Runs `attempt` until it succeeds, fails fatally, or exhausts the policy.
pub(super) async fn run_with_retry<T, F, Fut>(
    policy: RetryPolicy,
    operation: &'static str,
    mut attempt: F,
) -> Result<T, LedgerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let mut attempts = 1;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Fatal(err)) => return Err(err),
            Err(AttemptError::Conflict(reason)) => {
                if attempts >= policy.max_attempts {
                    tracing::warn!(
                        operation,
                        attempts,
                        reason = %reason,
                        "Ledger transaction conflict persisted; giving up"
                    );
                    return Err(LedgerError::TransactionConflict { attempts });
                }

                let delay = policy.delay_for(attempts);
                tracing::debug!(
                    operation,
                    attempt = attempts,
                    delay_ms = delay.as_millis() as u64,
                    reason = %reason,
                    "Ledger transaction conflict; retrying"
                );
                sleep(delay).await;
                attempts += 1;
            }
        }
    }
}
