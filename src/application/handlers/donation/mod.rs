//! Donation handlers.
//!
//! ## Commands
//! - Processing gateway webhooks (verify, normalize, record, email)
//!
//! ## Queries
//! - Fetch a token-protected PDF receipt
//! - Campaign totals
//! - Recent public donations

mod fetch_receipt;
mod get_campaign_stats;
mod list_recent_donations;
mod process_webhook;

// Commands
pub use process_webhook::{
    EmailDispatch, ProcessWebhookCommand, ProcessWebhookHandler, ProcessWebhookResult,
    WebhookGateway,
};

// Queries
pub use fetch_receipt::{FetchReceiptHandler, FetchReceiptQuery, FetchReceiptResult};
pub use get_campaign_stats::{
    GetCampaignStatsHandler, GetCampaignStatsQuery, GetCampaignStatsResult,
};
pub use list_recent_donations::{
    ListRecentDonationsHandler, ListRecentDonationsQuery, DEFAULT_RECENT_LIMIT, MAX_RECENT_LIMIT,
};
