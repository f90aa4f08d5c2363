//! ListRecentDonationsHandler - Query handler for the public donor wall.

use std::sync::Arc;

use crate::domain::donation::{LedgerError, PublicDonationView};
use crate::ports::DonationLedger;

/// Entries returned when no limit is given.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Upper bound on a single page.
pub const MAX_RECENT_LIMIT: usize = 100;

/// Query for the newest public donations.
#[derive(Debug, Clone, Default)]
pub struct ListRecentDonationsQuery {
    /// Requested count; absent or zero means the default, larger values are clamped.
    pub limit: Option<usize>,
}

impl ListRecentDonationsQuery {
    pub fn effective_limit(&self) -> usize {
        match self.limit {
            None | Some(0) => DEFAULT_RECENT_LIMIT,
            Some(n) => n.min(MAX_RECENT_LIMIT),
        }
    }
}

pub struct ListRecentDonationsHandler {
    ledger: Arc<dyn DonationLedger>,
}

impl ListRecentDonationsHandler {
    pub fn new(ledger: Arc<dyn DonationLedger>) -> Self {
        Self { ledger }
    }

    pub async fn handle(
        &self,
        query: ListRecentDonationsQuery,
    ) -> Result<Vec<PublicDonationView>, LedgerError> {
        self.ledger.recent_donations(query.effective_limit()).await
    }
}
