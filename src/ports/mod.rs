//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `DonationLedger` - Idempotent donation recording and read models
//! - `AdminLedger` - Administrative corrections with audit trail
//! - `NotificationSender` - Best-effort receipt email delivery

mod donation_ledger;
mod notification_sender;

pub use donation_ledger::{AdminLedger, DonationLedger};
pub use notification_sender::{DeliveryError, EmailMessage, NotificationSender};
