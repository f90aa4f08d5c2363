//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Webhook ingestion is the only command; receipts, stats and the donor wall
//! are queries.

pub mod handlers;

pub use handlers::{
    FetchReceiptHandler, FetchReceiptQuery, GetCampaignStatsHandler, GetCampaignStatsQuery,
    ListRecentDonationsHandler, ListRecentDonationsQuery, ProcessWebhookCommand,
    ProcessWebhookHandler, WebhookGateway,
};
