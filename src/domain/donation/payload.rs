//! Provider webhook payloads and their normalization into [`DonationEvent`].
//!
//! Only the fields the ledger needs are captured; everything else in the
//! provider's schema is ignored by serde.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{Currency, DonationReference, MinorUnits, ValidationError};

use super::event::{first_present, ANONYMOUS_DONOR};
use super::{DonationEvent, DonationProvider};

/// Card-gateway event type that represents a completed donation.
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Regional-gateway event type that represents a completed donation.
pub const CHARGE_SUCCESS: &str = "charge.success";

const CARD_GATEWAY_DEFAULT_CURRENCY: &str = "NGN";
const REGIONAL_GATEWAY_DEFAULT_CURRENCY: &str = "NGN";

// ════════════════════════════════════════════════════════════════════════════
// Card gateway (Stripe)
// ════════════════════════════════════════════════════════════════════════════

/// Stripe webhook envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Event id (`evt_...`).
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default)]
    pub created: i64,

    pub data: StripeEventData,

    #[serde(default)]
    pub livemode: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// Polymorphic on `type`; a checkout session for donations.
    pub object: serde_json::Value,
}

impl StripeEvent {
    /// Classifies the event, decoding the checkout session for donations.
    pub fn into_notification(self) -> Result<Notification, serde_json::Error> {
        if self.event_type != CHECKOUT_SESSION_COMPLETED {
            return Ok(Notification::Ignored {
                event_type: self.event_type,
            });
        }
        let session: CheckoutSession = serde_json::from_value(self.data.object)?;
        Ok(Notification::Donation(ProviderPayload::CardGateway(session)))
    }
}

/// The parts of a Stripe checkout session a donation needs.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CheckoutSession {
    /// Session id (`cs_...`); becomes the donation reference.
    pub id: String,

    /// Total charged, in minor units.
    #[serde(default)]
    pub amount_total: Option<u64>,

    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub customer_email: Option<String>,

    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,

    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl CheckoutSession {
    fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(key))
            .map(String::as_str)
    }

    fn details_name(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|d| d.name.as_deref())
    }

    fn details_email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|d| d.email.as_deref())
    }

    fn normalize(&self) -> Result<DonationEvent, ValidationError> {
        let donor_name = first_present([
            self.metadata("donor_name"),
            self.details_name(),
            self.metadata("name"),
        ])
        .unwrap_or_else(|| ANONYMOUS_DONOR.to_string());

        let donor_email = first_present([
            self.customer_email.as_deref(),
            self.metadata("donor_email"),
            self.details_email(),
            self.metadata("email"),
        ]);

        Ok(DonationEvent {
            provider: DonationProvider::CardGateway,
            amount_minor_units: MinorUnits::new(self.amount_total.unwrap_or(0)),
            currency: Currency::parse_or(
                self.currency.as_deref(),
                CARD_GATEWAY_DEFAULT_CURRENCY,
            )?,
            donor_name,
            donor_email,
            reference: DonationReference::new(self.id.as_str())?,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Regional gateway (Paystack)
// ════════════════════════════════════════════════════════════════════════════

/// Paystack webhook envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaystackEvent {
    pub event: String,

    #[serde(default)]
    pub data: serde_json::Value,
}

impl PaystackEvent {
    /// Classifies the event, decoding the charge for donations.
    pub fn into_notification(self) -> Result<Notification, serde_json::Error> {
        if self.event != CHARGE_SUCCESS {
            return Ok(Notification::Ignored {
                event_type: self.event,
            });
        }
        let charge: ChargeData = serde_json::from_value(self.data)?;
        Ok(Notification::Donation(ProviderPayload::RegionalGateway(charge)))
    }
}

/// The parts of a Paystack charge a donation needs.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChargeData {
    /// Transaction reference; becomes the donation reference.
    #[serde(default)]
    pub reference: String,

    /// Amount charged, in minor units (kobo).
    #[serde(default)]
    pub amount: u64,

    #[serde(default)]
    pub currency: Option<String>,

    /// Free-form; an object when set by our checkout, sometimes an empty string.
    #[serde(default)]
    pub metadata: serde_json::Value,

    #[serde(default)]
    pub customer: Option<PaystackCustomer>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PaystackCustomer {
    #[serde(default)]
    pub email: Option<String>,
}

impl ChargeData {
    fn normalize(&self) -> Result<DonationEvent, ValidationError> {
        let donor_name = first_present([self
            .metadata
            .get("donor_name")
            .and_then(serde_json::Value::as_str)])
        .unwrap_or_else(|| ANONYMOUS_DONOR.to_string());

        let donor_email = first_present([self
            .customer
            .as_ref()
            .and_then(|c| c.email.as_deref())]);

        Ok(DonationEvent {
            provider: DonationProvider::RegionalGateway,
            amount_minor_units: MinorUnits::new(self.amount),
            currency: Currency::parse_or(
                self.currency.as_deref(),
                REGIONAL_GATEWAY_DEFAULT_CURRENCY,
            )?,
            donor_name,
            donor_email,
            reference: DonationReference::new(self.reference.as_str())?,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tagged union
// ════════════════════════════════════════════════════════════════════════════

/// A donation payload from either gateway.
#[derive(Debug, Clone)]
pub enum ProviderPayload {
    CardGateway(CheckoutSession),
    RegionalGateway(ChargeData),
}

impl ProviderPayload {
    /// Maps the provider-specific payload into the canonical event.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a missing reference or a malformed
    /// currency code.
    pub fn normalize(&self) -> Result<DonationEvent, ValidationError> {
        match self {
            ProviderPayload::CardGateway(session) => session.normalize(),
            ProviderPayload::RegionalGateway(charge) => charge.normalize(),
        }
    }

    pub fn provider(&self) -> DonationProvider {
        match self {
            ProviderPayload::CardGateway(_) => DonationProvider::CardGateway,
            ProviderPayload::RegionalGateway(_) => DonationProvider::RegionalGateway,
        }
    }
}

/// Outcome of classifying a verified webhook body.
#[derive(Debug, Clone)]
pub enum Notification {
    /// A completed payment that should reach the ledger.
    Donation(ProviderPayload),
    /// Any other event type; acknowledged without state change.
    Ignored { event_type: String },
}
