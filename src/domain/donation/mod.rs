//! Donation domain module.
//!
//! Canonical donation events, ledger records, the campaign aggregate and
//! receipt tokens.
//!
//! # Module Structure
//!
//! - `payload` - Provider webhook payloads and normalization
//! - `event` - Canonical `DonationEvent`
//! - `record` - `DonationRecord` and its public projection
//! - `campaign` - `CampaignAggregate` running totals
//! - `receipt_token` - Bearer tokens for receipt downloads
//! - `admin` - Administrative corrections and audit entries

mod admin;
mod campaign;
mod errors;
mod event;
mod payload;
mod provider;
mod receipt_token;
mod record;

pub use admin::{AuditAction, AuditLogEntry, DonationUpdates, ManualDonation};
pub use campaign::{CampaignAggregate, DEFAULT_CAMPAIGN_ID, DEFAULT_GOAL_MINOR_UNITS};
pub use errors::{LedgerError, ReceiptError};
pub use event::{DonationEvent, ANONYMOUS_DONOR};
pub use payload::{
    ChargeData, CheckoutSession, CustomerDetails, Notification, PaystackCustomer, PaystackEvent,
    ProviderPayload, StripeEvent, StripeEventData, CHARGE_SUCCESS, CHECKOUT_SESSION_COMPLETED,
};
pub use provider::{DonationProvider, DonationStatus};
pub use receipt_token::{ReceiptToken, RECEIPT_TOKEN_BYTES};
pub use record::{DonationRecord, PublicDonationView};

use serde::{Deserialize, Serialize};

/// Result of applying one event to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// False when the reference had already been recorded.
    pub applied: bool,
    pub receipt_token: ReceiptToken,
    pub record: DonationRecord,
}

/// Read-side snapshot of the campaign aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignStats {
    pub total_minor_units: u64,
    pub donation_count: u64,
    pub goal_minor_units: u64,
    pub updated_at: crate::domain::foundation::Timestamp,
}

impl From<&CampaignAggregate> for CampaignStats {
    fn from(campaign: &CampaignAggregate) -> Self {
        Self {
            total_minor_units: campaign.total_minor_units.value(),
            donation_count: campaign.donation_count,
            goal_minor_units: campaign.goal_minor_units.value(),
            updated_at: campaign.updated_at,
        }
    }
}
