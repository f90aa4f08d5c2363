//! Adapters - Implementations of port interfaces.
//!
//! - `postgres` - Transactional ledger (production)
//! - `memory` - In-process ledger (development, tests)
//! - `brevo` - Receipt email delivery
//! - `http` - Axum REST surface

pub mod brevo;
pub mod http;
pub mod memory;
pub mod postgres;

pub use brevo::BrevoEmailSender;
pub use memory::InMemoryDonationLedger;
pub use postgres::PostgresDonationLedger;
