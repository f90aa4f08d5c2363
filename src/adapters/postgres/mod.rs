//! PostgreSQL adapters - Database implementations for ledger ports.
//!
//! - `PostgresDonationLedger` - Transactional ledger with bounded conflict retry
//! - `RetryPolicy` - Attempt count and backoff for conflicting transactions

mod donation_ledger;
mod retry;

pub use donation_ledger::PostgresDonationLedger;
pub use retry::RetryPolicy;
