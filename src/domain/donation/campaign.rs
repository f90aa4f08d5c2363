//! Campaign aggregate: the running total every donation contributes to.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MinorUnits, Timestamp};

/// Default campaign identifier.
pub const DEFAULT_CAMPAIGN_ID: &str = "global";

/// Default campaign goal: 1,000,000.00 in minor units.
pub const DEFAULT_GOAL_MINOR_UNITS: u64 = 100_000_000;

/// Running totals for one campaign.
///
/// # Invariants
///
/// - `total_minor_units` equals the sum of amounts over counted donation records
/// - `donation_count` equals the number of counted donation records
/// - Mutated only inside a ledger transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignAggregate {
    pub id: String,
    pub total_minor_units: MinorUnits,
    pub donation_count: u64,
    pub goal_minor_units: MinorUnits,
    pub updated_at: Timestamp,
}

impl CampaignAggregate {
    /// A fresh campaign with no donations.
    pub fn new(id: impl Into<String>, goal: MinorUnits, now: Timestamp) -> Self {
        Self {
            id: id.into(),
            total_minor_units: MinorUnits::ZERO,
            donation_count: 0,
            goal_minor_units: goal,
            updated_at: now,
        }
    }

    /// Counts a newly recorded donation.
    pub fn record_donation(&mut self, amount: MinorUnits, now: Timestamp) {
        self.total_minor_units = self.total_minor_units.saturating_add(amount);
        self.donation_count = self.donation_count.saturating_add(1);
        self.updated_at = now;
    }

    /// Applies an edited amount as a delta.
    pub fn adjust_amount(&mut self, previous: MinorUnits, current: MinorUnits, now: Timestamp) {
        self.total_minor_units = self
            .total_minor_units
            .saturating_sub(previous)
            .saturating_add(current);
        self.updated_at = now;
    }

    /// Uncounts a deleted donation. Both totals floor at zero.
    pub fn remove_donation(&mut self, amount: MinorUnits, now: Timestamp) {
        self.total_minor_units = self.total_minor_units.saturating_sub(amount);
        self.donation_count = self.donation_count.saturating_sub(1);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign() -> CampaignAggregate {
        CampaignAggregate::new(
            DEFAULT_CAMPAIGN_ID,
            MinorUnits::new(DEFAULT_GOAL_MINOR_UNITS),
            Timestamp::now(),
        )
    }

    #[test]
    fn new_campaign_is_empty() {
        let campaign = campaign();
        assert_eq!(campaign.total_minor_units, MinorUnits::ZERO);
        assert_eq!(campaign.donation_count, 0);
        assert_eq!(campaign.goal_minor_units.value(), 100_000_000);
    }

    #[test]
    fn record_donation_increments_total_and_count() {
        let mut campaign = campaign();
        campaign.record_donation(MinorUnits::new(500_000), Timestamp::now());
        campaign.record_donation(MinorUnits::new(250), Timestamp::now());

        assert_eq!(campaign.total_minor_units, MinorUnits::new(500_250));
        assert_eq!(campaign.donation_count, 2);
    }

    #[test]
    fn adjust_amount_applies_delta_in_both_directions() {
        let mut campaign = campaign();
        campaign.record_donation(MinorUnits::new(1_000), Timestamp::now());

        campaign.adjust_amount(MinorUnits::new(1_000), MinorUnits::new(1_500), Timestamp::now());
        assert_eq!(campaign.total_minor_units, MinorUnits::new(1_500));

        campaign.adjust_amount(MinorUnits::new(1_500), MinorUnits::new(200), Timestamp::now());
        assert_eq!(campaign.total_minor_units, MinorUnits::new(200));
        assert_eq!(campaign.donation_count, 1);
    }

    #[test]
    fn remove_donation_floors_at_zero() {
        let mut campaign = campaign();
        campaign.remove_donation(MinorUnits::new(10), Timestamp::now());

        assert_eq!(campaign.total_minor_units, MinorUnits::ZERO);
        assert_eq!(campaign.donation_count, 0);
    }
}
