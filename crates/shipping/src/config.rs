//! Shipment settings: identifier shape, retry budget, charge label.

use serde::{Deserialize, Serialize};

use shipkit_core::{DomainError, DomainResult};

pub const ENV_MAX_NUMBER_ATTEMPTS: &str = "SHIPKIT_NUMBER_MAX_ATTEMPTS";
pub const ENV_CHARGE_LABEL: &str = "SHIPKIT_CHARGE_LABEL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingSettings {
    /// Leading character(s) of every shipment number.
    pub number_prefix: String,
    /// Random decimal digits following the prefix.
    pub number_digits: usize,
    /// Candidates tried before giving up with `IdentifierGenerationExhausted`.
    pub max_number_attempts: u32,
    /// Localised label rendered as `"<label> (<method name>)"` on charges.
    pub charge_label: String,
}

impl Default for ShippingSettings {
    fn default() -> Self {
        Self {
            number_prefix: "H".to_string(),
            number_digits: 11,
            max_number_attempts: 10,
            charge_label: "Shipping".to_string(),
        }
    }
}

impl ShippingSettings {
    /// Defaults, overridden by `SHIPKIT_*` environment variables when set.
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DomainResult<Self> {
        let mut settings = Self::default();

        if let Some(raw) = lookup(ENV_MAX_NUMBER_ATTEMPTS) {
            settings.max_number_attempts = raw.trim().parse().map_err(|_| {
                DomainError::validation(
                    "max_number_attempts",
                    format!("{ENV_MAX_NUMBER_ATTEMPTS} must be a positive integer, got '{raw}'"),
                )
            })?;
        }

        if let Some(label) = lookup(ENV_CHARGE_LABEL) {
            settings.charge_label = label;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.max_number_attempts == 0 {
            return Err(DomainError::validation(
                "max_number_attempts",
                "must be at least 1",
            ));
        }
        if self.number_digits == 0 {
            return Err(DomainError::validation("number_digits", "must be at least 1"));
        }
        if self.charge_label.trim().is_empty() {
            return Err(DomainError::validation("charge_label", "can't be blank"));
        }
        Ok(())
    }
}
