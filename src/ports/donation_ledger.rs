//! Donation ledger ports.
//!
//! The ledger owns the campaign aggregate and every donation record, and
//! updates them together atomically.
//!
//! # Design
//!
//! - **Idempotent by reference**: `apply` records a reference at most once
//! - **Token stability**: the receipt token is issued inside the same
//!   transaction that creates the record and is returned unchanged on replays
//! - **Bounded retries**: transaction conflicts are retried with backoff, then
//!   surface as `LedgerError::TransactionConflict`

use async_trait::async_trait;

use crate::domain::donation::{
    ApplyOutcome, AuditLogEntry, CampaignStats, DonationEvent, DonationRecord, DonationUpdates,
    LedgerError, ManualDonation, PublicDonationView,
};
use crate::domain::foundation::DonationReference;

/// Webhook-facing ledger operations and read models.
#[async_trait]
pub trait DonationLedger: Send + Sync {
    /// Records `event` exactly once per reference.
    ///
    /// A new reference increments the aggregate, issues a receipt token and
    /// writes the record and its public view. A known reference leaves the
    /// aggregate alone, keeps the stored token and merges donor contact
    /// fields only.
    ///
    /// # Errors
    ///
    /// - `TransactionConflict` when retries are exhausted
    /// - `CampaignMissing` if the aggregate cannot be initialised
    /// - `Storage` on persistence failure
    async fn apply(&self, event: &DonationEvent) -> Result<ApplyOutcome, LedgerError>;

    /// Looks up a donation record, including its receipt token.
    async fn find_by_reference(
        &self,
        reference: &DonationReference,
    ) -> Result<Option<DonationRecord>, LedgerError>;

    /// Current totals, initialising the campaign if it does not exist yet.
    async fn campaign_stats(&self) -> Result<CampaignStats, LedgerError>;

    /// Public donor-wall entries, newest first.
    async fn recent_donations(&self, limit: usize) -> Result<Vec<PublicDonationView>, LedgerError>;
}

/// Administrative corrections.
///
/// Each call is one atomic unit with the aggregate and appends an audit
/// entry. Callers are responsible for authorising `actor_id`.
#[async_trait]
pub trait AdminLedger: Send + Sync {
    /// Changes name, email, currency or amount. An amount change adjusts the
    /// aggregate total by the delta.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the reference is unknown
    /// - `Validation` for malformed fields
    async fn edit(
        &self,
        reference: &DonationReference,
        updates: &DonationUpdates,
        actor_id: &str,
    ) -> Result<DonationRecord, LedgerError>;

    /// Removes a donation and uncounts it from the aggregate.
    async fn delete(&self, reference: &DonationReference, actor_id: &str) -> Result<(), LedgerError>;

    /// Records an offline donation under a generated `manual_` reference.
    async fn manual_add(
        &self,
        donation: ManualDonation,
        actor_id: &str,
    ) -> Result<DonationRecord, LedgerError>;

    /// Audit entries for one donation, oldest first.
    async fn audit_log(&self, reference: &DonationReference)
        -> Result<Vec<AuditLogEntry>, LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn donation_ledger_is_object_safe() {
        fn _accepts_dyn(_ledger: &dyn DonationLedger) {}
    }

    #[test]
    fn admin_ledger_is_object_safe() {
        fn _accepts_dyn(_ledger: &dyn AdminLedger) {}
    }
}
