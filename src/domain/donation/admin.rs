//! Administrative ledger corrections and their audit trail.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    AuditEntryId, Currency, DonationReference, MinorUnits, Timestamp, ValidationError,
};

use super::event::{first_present, ANONYMOUS_DONOR};
use super::{DonationProvider, DonationRecord, DonationStatus, ReceiptToken};

const MANUAL_DEFAULT_CURRENCY: &str = "NGN";

/// Kind of administrative change recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Edit,
    Delete,
    ManualAdd,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Edit => "edit",
            AuditAction::Delete => "delete",
            AuditAction::ManualAdd => "manual_add",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "edit" => Ok(AuditAction::Edit),
            "delete" => Ok(AuditAction::Delete),
            "manual_add" => Ok(AuditAction::ManualAdd),
            other => Err(ValidationError::invalid_format(
                "action",
                format!("unknown audit action '{}'", other),
            )),
        }
    }
}

/// Append-only record of one administrative change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: AuditEntryId,
    pub action: AuditAction,
    pub donation_reference: DonationReference,
    /// Record snapshot before the change; `None` for manual adds.
    pub before: Option<serde_json::Value>,
    /// Record snapshot after the change; `None` for deletes.
    pub after: Option<serde_json::Value>,
    pub actor_id: String,
    pub created_at: Timestamp,
}

impl AuditLogEntry {
    pub fn new(
        action: AuditAction,
        donation_reference: DonationReference,
        before: Option<&DonationRecord>,
        after: Option<&DonationRecord>,
        actor_id: impl Into<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            id: AuditEntryId::new(),
            action,
            donation_reference,
            before: before.map(snapshot),
            after: after.map(snapshot),
            actor_id: actor_id.into(),
            created_at: now,
        }
    }
}

// Receipt tokens stay out of the audit trail.
fn snapshot(record: &DonationRecord) -> serde_json::Value {
    serde_json::json!({
        "reference": record.reference,
        "provider": record.provider,
        "amount_minor_units": record.amount_minor_units,
        "currency": record.currency,
        "donor_name": record.donor_name,
        "donor_email": record.donor_email,
        "status": record.status,
        "created_at": record.created_at,
        "updated_at": record.updated_at,
    })
}

/// Fields an administrator may change on an existing donation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationUpdates {
    #[serde(default)]
    pub donor_name: Option<String>,
    /// `Some(None)` clears the email.
    #[serde(default)]
    pub donor_email: Option<Option<String>>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub amount_minor_units: Option<MinorUnits>,
}

impl DonationUpdates {
    pub fn is_empty(&self) -> bool {
        self.donor_name.is_none()
            && self.donor_email.is_none()
            && self.currency.is_none()
            && self.amount_minor_units.is_none()
    }

    /// Applies the allowed fields to `record`.
    ///
    /// Validation runs before any field is written, so a failed update
    /// leaves the record untouched.
    pub fn apply_to(&self, record: &mut DonationRecord, now: Timestamp) -> Result<(), ValidationError> {
        let currency = self
            .currency
            .as_deref()
            .map(Currency::parse)
            .transpose()?;

        if let Some(name) = &self.donor_name {
            record.donor_name =
                first_present([Some(name.as_str())]).unwrap_or_else(|| ANONYMOUS_DONOR.to_string());
        }
        if let Some(email) = &self.donor_email {
            record.donor_email = first_present([email.as_deref()]);
        }
        if let Some(currency) = currency {
            record.currency = currency;
        }
        if let Some(amount) = self.amount_minor_units {
            record.amount_minor_units = amount;
        }
        record.updated_at = now;
        Ok(())
    }
}

/// An offline donation (bank transfer, cash) entered by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualDonation {
    #[serde(default)]
    pub donor_name: Option<String>,
    #[serde(default)]
    pub donor_email: Option<String>,
    pub amount_minor_units: MinorUnits,
    #[serde(default)]
    pub currency: Option<String>,
}

impl ManualDonation {
    /// Builds the ledger record under a freshly generated `manual_` reference.
    ///
    /// # Errors
    ///
    /// Rejects zero amounts and malformed currency codes.
    pub fn into_record(
        self,
        receipt_token: ReceiptToken,
        now: Timestamp,
    ) -> Result<DonationRecord, ValidationError> {
        if self.amount_minor_units.is_zero() {
            return Err(ValidationError::invalid_format(
                "amount_minor_units",
                "must be greater than zero",
            ));
        }

        Ok(DonationRecord {
            reference: DonationReference::manual(),
            provider: DonationProvider::Manual,
            amount_minor_units: self.amount_minor_units,
            currency: Currency::parse_or(self.currency.as_deref(), MANUAL_DEFAULT_CURRENCY)?,
            donor_name: first_present([self.donor_name.as_deref()])
                .unwrap_or_else(|| ANONYMOUS_DONOR.to_string()),
            donor_email: first_present([self.donor_email.as_deref()]),
            status: DonationStatus::Success,
            receipt_token: Some(receipt_token),
            created_at: now,
            updated_at: now,
        })
    }
}
