//! HTTP adapters - REST API implementations.

pub mod donations;

use std::time::Duration;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use donations::{donation_router, DonationAppState};

/// Builds the application router with tracing and request timeout applied.
///
/// CORS is layered on by the caller, which knows the allowed origins.
pub fn router(state: DonationAppState, request_timeout: Duration) -> Router {
    Router::new()
        .nest("/api", donation_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}
