//! HTTP DTOs (Data Transfer Objects) for donation endpoints.
//!
//! Field names follow the public JSON contract consumed by the campaign page
//! (`camelCase`, amounts in minor units).

use serde::{Deserialize, Serialize};

use crate::domain::donation::{CampaignStats, PublicDonationView};
use crate::domain::foundation::DomainError;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Query string of `GET /api/receipt`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReceiptParams {
    /// Donation reference.
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    /// Receipt token.
    #[serde(default, rename = "t")]
    pub token: Option<String>,
}

/// Query string of `GET /api/donations`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentDonationsParams {
    /// Kept as text so a malformed value falls back to the default.
    #[serde(default)]
    pub limit: Option<String>,
}

impl RecentDonationsParams {
    pub fn parsed_limit(&self) -> Option<usize> {
        self.limit.as_deref().and_then(|l| l.trim().parse().ok())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Acknowledgement returned to payment gateways.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

impl WebhookAck {
    pub fn received() -> Self {
        Self { received: true }
    }
}

/// Campaign progress counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStatsResponse {
    /// Amount raised, minor units.
    pub total: u64,
    /// Distinct donations counted.
    pub count: u64,
    /// Target, minor units.
    pub goal: u64,
    /// ISO 8601.
    pub updated_at: String,
}

impl From<CampaignStats> for CampaignStatsResponse {
    fn from(stats: CampaignStats) -> Self {
        Self {
            total: stats.total_minor_units,
            count: stats.donation_count,
            goal: stats.goal_minor_units,
            updated_at: stats.updated_at.to_rfc3339(),
        }
    }
}

/// One public donor-wall entry. Never carries email or receipt token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicDonationResponse {
    pub id: String,
    pub provider: String,
    pub amount_minor: u64,
    pub currency: String,
    pub name: String,
    pub created_at: String,
}

impl From<PublicDonationView> for PublicDonationResponse {
    fn from(view: PublicDonationView) -> Self {
        Self {
            id: view.reference.as_str().to_string(),
            provider: view.provider.as_str().to_string(),
            amount_minor: view.amount_minor_units.value(),
            currency: view.currency.as_str().to_string(),
            name: view.donor_name,
            created_at: view.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentDonationsResponse {
    pub donations: Vec<PublicDonationResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Standard JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        Self::new(err.code.to_string(), err.message)
    }
}
