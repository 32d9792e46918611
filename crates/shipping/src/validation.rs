//! Checks run before a shipment is saved.

use shipkit_core::{DomainError, DomainResult, FieldError};

use crate::model::OrderState;
use crate::shipment::Shipment;

pub const BLANK: &str = "can't be blank";
pub const METHOD_UNAVAILABLE: &str = "is not available to shipment address";

/// Collect every failing rule into a single `Validation` error.
pub fn validate(shipment: &Shipment, order_state: OrderState) -> DomainResult<()> {
    let mut errors = Vec::new();

    if order_state.requires_inventory_units() && shipment.inventory_units().is_empty() {
        errors.push(FieldError::new("inventory_units", BLANK));
    }

    if let Some(method) = shipment.shipping_method() {
        let covered = shipment
            .address()
            .is_some_and(|address| method.zone.includes(address));
        if !covered {
            errors.push(FieldError::new("shipping_method", METHOD_UNAVAILABLE));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(shipment = %shipment.id_typed(), errors = errors.len(), "shipment invalid");
        Err(DomainError::Validation(errors))
    }
}
