//! Keeps exactly one shipping charge per shipment in step with its method.
//!
//! The charge amount belongs to the pricing collaborator; nothing here sets
//! or changes it.

use shipkit_core::{OrderId, ShipmentId};

use crate::error::PersistenceError;
use crate::model::{NewShippingCharge, ShippingCharge, ShippingMethod};
use crate::ports::ChargeStore;

/// Result of synchronising a shipment's charge after a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeSync {
    /// No shipping method assigned; nothing created or touched.
    Skipped,
    Created(ShippingCharge),
    /// Description re-rendered for a changed method.
    Refreshed(ShippingCharge),
    Unchanged(ShippingCharge),
}

impl ChargeSync {
    pub fn charge(&self) -> Option<&ShippingCharge> {
        match self {
            ChargeSync::Skipped => None,
            ChargeSync::Created(c) | ChargeSync::Refreshed(c) | ChargeSync::Unchanged(c) => Some(c),
        }
    }

    pub fn into_charge(self) -> Option<ShippingCharge> {
        match self {
            ChargeSync::Skipped => None,
            ChargeSync::Created(c) | ChargeSync::Refreshed(c) | ChargeSync::Unchanged(c) => Some(c),
        }
    }
}

/// `"<label> (<method name>)"`.
pub fn description_for(label: &str, method: &ShippingMethod) -> String {
    format!("{label} ({})", method.name)
}

pub struct ShippingChargeManager<'a> {
    charges: &'a dyn ChargeStore,
    label: &'a str,
}

impl<'a> ShippingChargeManager<'a> {
    pub fn new(charges: &'a dyn ChargeStore, label: &'a str) -> Self {
        Self { charges, label }
    }

    /// Ensure the charge exists and carries the current description.
    pub fn sync(
        &self,
        shipment: ShipmentId,
        order: OrderId,
        method: Option<&ShippingMethod>,
    ) -> Result<ChargeSync, PersistenceError> {
        let Some(method) = method else {
            return Ok(ChargeSync::Skipped);
        };
        let description = description_for(self.label, method);

        match self.charges.find_by_source(shipment)? {
            None => {
                let charge = self.charges.create(NewShippingCharge {
                    order_id: order,
                    description,
                    source: shipment,
                })?;
                tracing::info!(
                    shipment = %shipment,
                    order = %order,
                    charge = %charge.id,
                    description = %charge.description,
                    "shipping charge created"
                );
                Ok(ChargeSync::Created(charge))
            }
            Some(mut charge) => {
                if self.refresh(&mut charge, &description)? {
                    Ok(ChargeSync::Refreshed(charge))
                } else {
                    Ok(ChargeSync::Unchanged(charge))
                }
            }
        }
    }

    /// Re-render the description on an existing charge if it drifted.
    ///
    /// Returns whether a write happened.
    pub fn refresh(
        &self,
        charge: &mut ShippingCharge,
        description: &str,
    ) -> Result<bool, PersistenceError> {
        if charge.description == description {
            return Ok(false);
        }
        self.charges.update_description(charge.id, description)?;
        tracing::info!(
            charge = %charge.id,
            from = %charge.description,
            to = %description,
            "shipping charge description refreshed"
        );
        charge.description = description.to_string();
        Ok(true)
    }
}
