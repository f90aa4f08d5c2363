//! HTTP adapter for donation endpoints.
//!
//! - `POST /api/stripe/webhook` - Card gateway webhook
//! - `POST /api/paystack/webhook` - Regional gateway webhook
//! - `GET /api/receipt` - PDF receipt download
//! - `GET /api/stats` - Campaign totals
//! - `GET /api/donations` - Recent public donations
//! - `GET /api/health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::DonationAppState;
pub use routes::donation_router;
