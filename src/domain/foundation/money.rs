//! Money value objects: amounts in minor units and ISO currency codes.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A non-negative amount in the smallest currency unit (cents, kobo).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MinorUnits(u64);

impl MinorUnits {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Converts a major-unit amount (e.g. `12.34` dollars) to minor units,
    /// rounding to the nearest unit. Negative or non-finite input is rejected.
    pub fn from_major(major: f64) -> Result<Self, ValidationError> {
        if !major.is_finite() || major < 0.0 {
            return Err(ValidationError::invalid_format(
                "amount",
                "must be a finite, non-negative number",
            ));
        }
        Ok(Self((major * 100.0).round() as u64))
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn saturating_add(self, other: MinorUnits) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: MinorUnits) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Major units with thousands separators and two decimals: `5,000.00`.
    pub fn to_major_string(&self) -> String {
        let major = self.0 / 100;
        let minor = self.0 % 100;
        format!("{}.{:02}", group_thousands(major), minor)
    }
}

impl fmt::Display for MinorUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Uppercased ISO-4217 style currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    /// Parses a currency code, trimming and uppercasing it.
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ValidationError::empty_field("currency"));
        }
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                "must be a three-letter code",
            ));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    /// Parses `code` if present and non-blank, otherwise uses `default`.
    pub fn parse_or(code: Option<&str>, default: &str) -> Result<Self, ValidationError> {
        match code.map(str::trim).filter(|c| !c.is_empty()) {
            Some(code) => Self::parse(code),
            None => Self::parse(default),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Receipt amount text: `<CURRENCY> <major, grouped, 2 decimals>`.
pub fn format_amount(currency: &Currency, amount: MinorUnits) -> String {
    format!("{} {}", currency, amount.to_major_string())
}
