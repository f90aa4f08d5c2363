//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types
//! that form the vocabulary of the donation domain.

mod errors;
mod ids;
mod money;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{AuditEntryId, DonationReference};
pub use money::{format_amount, Currency, MinorUnits};
pub use timestamp::Timestamp;
