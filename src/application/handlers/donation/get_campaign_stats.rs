//! GetCampaignStatsHandler - Query handler for the campaign progress counter.

use std::sync::Arc;

use crate::domain::donation::{CampaignStats, LedgerError};
use crate::ports::DonationLedger;

/// Query for campaign totals.
#[derive(Debug, Clone, Default)]
pub struct GetCampaignStatsQuery {}

pub type GetCampaignStatsResult = CampaignStats;

pub struct GetCampaignStatsHandler {
    ledger: Arc<dyn DonationLedger>,
}

impl GetCampaignStatsHandler {
    pub fn new(ledger: Arc<dyn DonationLedger>) -> Self {
        Self { ledger }
    }

    pub async fn handle(
        &self,
        _query: GetCampaignStatsQuery,
    ) -> Result<GetCampaignStatsResult, LedgerError> {
        self.ledger.campaign_stats().await
    }
}
