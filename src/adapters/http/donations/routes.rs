//! Axum router configuration for donation endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    get_receipt, get_stats, health, list_donations, paystack_webhook, stripe_webhook,
    DonationAppState,
};

/// Gateway callbacks. No user auth; each request is signature-verified.
///
/// # Routes
/// - `POST /stripe/webhook`
/// - `POST /paystack/webhook`
pub fn webhook_routes() -> Router<DonationAppState> {
    Router::new()
        .route("/stripe/webhook", post(stripe_webhook))
        .route("/paystack/webhook", post(paystack_webhook))
}

/// Public reads.
///
/// # Routes
/// - `GET /receipt?ref=&t=` - PDF receipt (token-protected)
/// - `GET /stats` - Campaign totals
/// - `GET /donations?limit=` - Donor wall
/// - `GET /health` - Liveness
pub fn public_routes() -> Router<DonationAppState> {
    Router::new()
        .route("/receipt", get(get_receipt))
        .route("/stats", get(get_stats))
        .route("/donations", get(list_donations))
        .route("/health", get(health))
}

/// Complete donation router, suitable for mounting at `/api`.
pub fn donation_router() -> Router<DonationAppState> {
    Router::new().merge(webhook_routes()).merge(public_routes())
}
