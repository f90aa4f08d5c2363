//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod donation;

pub use donation::{
    EmailDispatch, FetchReceiptHandler, FetchReceiptQuery, FetchReceiptResult,
    GetCampaignStatsHandler, GetCampaignStatsQuery, GetCampaignStatsResult,
    ListRecentDonationsHandler, ListRecentDonationsQuery, ProcessWebhookCommand,
    ProcessWebhookHandler, ProcessWebhookResult, WebhookGateway,
};
