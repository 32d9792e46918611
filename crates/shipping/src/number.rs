//! Human-readable shipment numbers and their generation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use shipkit_core::{DomainError, ShipmentId};

use crate::config::ShippingSettings;
use crate::error::ShipmentError;
use crate::ports::ShipmentNumberRegistry;

/// Shipment number, e.g. `H04718293650`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipmentNumber(String);

impl ShipmentNumber {
    /// Accept a stored number or a permalink (any case).
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_id("shipment number cannot be empty"));
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(DomainError::invalid_id(format!(
                "shipment number must be alphanumeric, got '{trimmed}'"
            )));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL-safe, uppercase rendering used in permalinks.
    pub fn to_param(&self) -> String {
        parameterize(&self.0).to_ascii_uppercase()
    }
}

impl core::fmt::Display for ShipmentNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase, with every run of non-alphanumerics collapsed to a single `-`.
fn parameterize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Draw one candidate: prefix followed by `number_digits` random digits.
pub fn candidate<R: Rng + ?Sized>(rng: &mut R, settings: &ShippingSettings) -> ShipmentNumber {
    let mut number = String::with_capacity(settings.number_prefix.len() + settings.number_digits);
    number.push_str(&settings.number_prefix);
    for _ in 0..settings.number_digits {
        let digit = rng.gen_range(0..10u32);
        number.push(char::from_digit(digit, 10).unwrap_or('0'));
    }
    ShipmentNumber(number)
}

/// Find and claim an unused number for `shipment`.
///
/// Uniqueness rests on the registry's atomic claim, so a concurrent creator
/// that wins the same candidate simply costs this one an attempt.
pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    registry: &dyn ShipmentNumberRegistry,
    shipment: ShipmentId,
    settings: &ShippingSettings,
) -> Result<ShipmentNumber, ShipmentError> {
    for attempt in 1..=settings.max_number_attempts {
        let number = candidate(rng, settings);
        if registry.claim(&number, shipment)? {
            tracing::debug!(shipment = %shipment, number = %number, attempt, "shipment number claimed");
            return Ok(number);
        }
        tracing::debug!(shipment = %shipment, number = %number, attempt, "shipment number collision");
    }

    tracing::warn!(
        shipment = %shipment,
        attempts = settings.max_number_attempts,
        "no unused shipment number found"
    );
    Err(DomainError::IdentifierGenerationExhausted {
        attempts: settings.max_number_attempts,
    }
    .into())
}
