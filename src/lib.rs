//! Donation Ledger - campaign donation service
//!
//! Ingests payment gateway webhooks, records each donation exactly once in a
//! campaign ledger, and issues token-protected receipts by email and PDF.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
pub mod server;
