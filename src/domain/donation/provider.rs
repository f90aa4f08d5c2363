//! Payment provider and donation status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Where a donation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DonationProvider {
    /// Card-payment gateway (Stripe checkout).
    #[serde(rename = "stripe")]
    CardGateway,
    /// Regional payment gateway (Paystack).
    #[serde(rename = "paystack")]
    RegionalGateway,
    /// Recorded by an administrator (bank transfer, cash).
    #[serde(rename = "manual")]
    Manual,
}

impl DonationProvider {
    /// Stable storage and wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationProvider::CardGateway => "stripe",
            DonationProvider::RegionalGateway => "paystack",
            DonationProvider::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_lowercase().as_str() {
            "stripe" => Ok(DonationProvider::CardGateway),
            "paystack" => Ok(DonationProvider::RegionalGateway),
            "manual" => Ok(DonationProvider::Manual),
            other => Err(ValidationError::invalid_format(
                "provider",
                format!("unknown provider '{}'", other),
            )),
        }
    }
}

impl fmt::Display for DonationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment status of a donation record.
///
/// Webhooks only ever produce `Success`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Success,
    Pending,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Success => "success",
            DonationStatus::Pending => "pending",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_lowercase().as_str() {
            "success" => Ok(DonationStatus::Success),
            "pending" => Ok(DonationStatus::Pending),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown status '{}'", other),
            )),
        }
    }
}
