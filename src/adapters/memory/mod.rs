//! In-memory adapters for development and testing.

mod in_memory_ledger;

pub use in_memory_ledger::InMemoryDonationLedger;
