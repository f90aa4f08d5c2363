//! Donation record and its public projection.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Currency, DonationReference, MinorUnits, Timestamp};

use super::{DonationEvent, DonationProvider, DonationStatus, ReceiptToken};

/// One donation, keyed by its provider reference.
///
/// # Invariants
///
/// - `reference` is unique across the ledger
/// - `receipt_token` and `created_at` are written once and never change
/// - webhook replays never change `amount_minor_units`, `currency` or `provider`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub reference: DonationReference,
    pub provider: DonationProvider,
    pub amount_minor_units: MinorUnits,
    pub currency: Currency,
    pub donor_name: String,
    pub donor_email: Option<String>,
    pub status: DonationStatus,
    pub receipt_token: Option<ReceiptToken>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DonationRecord {
    /// Creates the record for a donation the ledger has not seen before.
    pub fn from_event(event: &DonationEvent, receipt_token: ReceiptToken, now: Timestamp) -> Self {
        Self {
            reference: event.reference.clone(),
            provider: event.provider,
            amount_minor_units: event.amount_minor_units,
            currency: event.currency.clone(),
            donor_name: event.donor_name.clone(),
            donor_email: event.donor_email.clone(),
            status: DonationStatus::Success,
            receipt_token: Some(receipt_token),
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges donor contact fields from a replayed event.
    ///
    /// A placeholder name or a missing email never overwrites a stored value.
    /// Returns true when anything changed.
    pub fn merge_contact(&mut self, event: &DonationEvent, now: Timestamp) -> bool {
        let mut changed = false;

        if event.has_named_donor() && event.donor_name != self.donor_name {
            self.donor_name = event.donor_name.clone();
            changed = true;
        }
        if let Some(email) = &event.donor_email {
            if self.donor_email.as_ref() != Some(email) {
                self.donor_email = Some(email.clone());
                changed = true;
            }
        }
        if changed {
            self.updated_at = now;
        }
        changed
    }

    /// Redacted projection for the public donor wall.
    pub fn public_view(&self) -> PublicDonationView {
        PublicDonationView {
            reference: self.reference.clone(),
            provider: self.provider,
            amount_minor_units: self.amount_minor_units,
            currency: self.currency.clone(),
            donor_name: self.donor_name.clone(),
            created_at: self.created_at,
        }
    }

    /// Whether this record contributes to the campaign aggregate.
    pub fn is_counted(&self) -> bool {
        self.status == DonationStatus::Success
    }
}

/// Public donor-wall entry. Carries no email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicDonationView {
    pub reference: DonationReference,
    pub provider: DonationProvider,
    pub amount_minor_units: MinorUnits,
    pub currency: Currency,
    pub donor_name: String,
    pub created_at: Timestamp,
}
