//! HTTP handlers for donation endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::donation::{
    FetchReceiptHandler, FetchReceiptQuery, GetCampaignStatsHandler, GetCampaignStatsQuery,
    ListRecentDonationsHandler, ListRecentDonationsQuery, ProcessWebhookCommand,
    ProcessWebhookHandler, WebhookGateway,
};
use crate::domain::donation::{LedgerError, ReceiptError};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::receipt::{ReceiptBranding, ReceiptFormat};
use crate::domain::webhook::{SignatureVerifier, WebhookError};
use crate::ports::{DonationLedger, NotificationSender};

use super::dto::{
    CampaignStatsResponse, ErrorResponse, HealthResponse, PublicDonationResponse, ReceiptParams,
    RecentDonationsParams, RecentDonationsResponse, WebhookAck,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned per request; every dependency is behind an `Arc`.
#[derive(Clone)]
pub struct DonationAppState {
    pub ledger: Arc<dyn DonationLedger>,
    pub notifier: Arc<dyn NotificationSender>,
    pub stripe_verifier: Arc<dyn SignatureVerifier>,
    pub paystack_verifier: Arc<dyn SignatureVerifier>,
    pub branding: Arc<ReceiptBranding>,
}

impl DonationAppState {
    pub fn webhook_handler(&self, gateway: WebhookGateway) -> ProcessWebhookHandler {
        let verifier = match gateway {
            WebhookGateway::Stripe => self.stripe_verifier.clone(),
            WebhookGateway::Paystack => self.paystack_verifier.clone(),
        };
        ProcessWebhookHandler::new(
            gateway,
            verifier,
            self.ledger.clone(),
            self.notifier.clone(),
            self.branding.clone(),
        )
    }

    pub fn receipt_handler(&self) -> FetchReceiptHandler {
        FetchReceiptHandler::new(self.ledger.clone(), self.branding.clone())
    }

    pub fn stats_handler(&self) -> GetCampaignStatsHandler {
        GetCampaignStatsHandler::new(self.ledger.clone())
    }

    pub fn recent_donations_handler(&self) -> ListRecentDonationsHandler {
        ListRecentDonationsHandler::new(self.ledger.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhooks (POST, raw body)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/stripe/webhook - Card gateway webhook
pub async fn stripe_webhook(
    State(state): State<DonationAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    process(&state, WebhookGateway::Stripe, &headers, body).await
}

/// POST /api/paystack/webhook - Regional gateway webhook
pub async fn paystack_webhook(
    State(state): State<DonationAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    process(&state, WebhookGateway::Paystack, &headers, body).await
}

async fn process(
    state: &DonationAppState,
    gateway: WebhookGateway,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, WebhookApiError> {
    let handler = state.webhook_handler(gateway);
    let header_name = match gateway {
        WebhookGateway::Stripe => state.stripe_verifier.header_name(),
        WebhookGateway::Paystack => state.paystack_verifier.header_name(),
    };
    let signature = headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = ProcessWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    handler.handle(cmd).await?;

    Ok(Json(WebhookAck::received()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Queries (GET)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/receipt?ref=&t= - Token-protected PDF receipt
pub async fn get_receipt(
    State(state): State<DonationAppState>,
    Query(params): Query<ReceiptParams>,
) -> Result<impl IntoResponse, ReceiptApiError> {
    let handler = state.receipt_handler();
    let query = FetchReceiptQuery {
        reference: params.reference,
        token: params.token,
    };

    let result = handler.handle(query).await?;

    let disposition = format!("attachment; filename=\"{}\"", result.filename);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, ReceiptFormat::Pdf.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        result.pdf,
    ))
}

/// GET /api/stats - Campaign totals
pub async fn get_stats(
    State(state): State<DonationAppState>,
) -> Result<impl IntoResponse, LedgerApiError> {
    let handler = state.stats_handler();

    let stats = handler.handle(GetCampaignStatsQuery::default()).await?;

    Ok(Json(CampaignStatsResponse::from(stats)))
}

/// GET /api/donations?limit= - Newest public donations
pub async fn list_donations(
    State(state): State<DonationAppState>,
    Query(params): Query<RecentDonationsParams>,
) -> Result<impl IntoResponse, LedgerApiError> {
    let handler = state.recent_donations_handler();
    let query = ListRecentDonationsQuery {
        limit: params.parsed_limit(),
    };

    let donations = handler.handle(query).await?;

    Ok(Json(RecentDonationsResponse {
        donations: donations.into_iter().map(PublicDonationResponse::from).collect(),
    }))
}

/// GET /api/health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// Webhook failures. Gateways only look at the status code.
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        match &self.0 {
            WebhookError::Ignored(_) => (status, Json(WebhookAck::received())).into_response(),
            WebhookError::Ledger(err) => {
                let code = DomainError::from(err.clone()).code;
                let body = ErrorResponse::new(code.to_string(), "Failed to record donation");
                (status, Json(body)).into_response()
            }
            other => (status, format!("Webhook Error: {}", other)).into_response(),
        }
    }
}

/// Receipt failures, returned as plain text.
pub struct ReceiptApiError(ReceiptError);

impl From<ReceiptError> for ReceiptApiError {
    fn from(err: ReceiptError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ReceiptApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ReceiptError::MissingParameters => StatusCode::BAD_REQUEST,
            ReceiptError::NotFound => StatusCode::NOT_FOUND,
            ReceiptError::Forbidden => StatusCode::FORBIDDEN,
            ReceiptError::Ledger(err) => {
                tracing::error!(error = %err, "Receipt lookup failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to generate PDF receipt",
                )
                    .into_response();
            }
        };
        (status, self.0.to_string()).into_response()
    }
}

/// Read-model failures.
pub struct LedgerApiError(LedgerError);

impl From<LedgerError> for LedgerApiError {
    fn from(err: LedgerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for LedgerApiError {
    fn into_response(self) -> Response {
        let error = DomainError::from(self.0);
        let status = status_for(error.code);
        if status.is_server_error() {
            tracing::error!(error = %error, "Ledger read failed");
        }
        (status, Json(ErrorResponse::from(error))).into_response()
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::EmptyField | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,
        ErrorCode::DonationNotFound => StatusCode::NOT_FOUND,
        ErrorCode::CampaignNotFound | ErrorCode::DatabaseError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
