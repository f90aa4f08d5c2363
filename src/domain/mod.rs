//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `donation` - Donation events, ledger records and the campaign aggregate
//! - `webhook` - Provider signature verification
//! - `receipt` - Receipt rendering (HTML email body and PDF)

pub mod donation;
pub mod foundation;
pub mod receipt;
pub mod webhook;
