use std::collections::HashMap;
use std::sync::RwLock;

use shipkit_core::{ChargeId, OrderId, ShipmentId};
use shipkit_shipping::{ChargeStore, NewShippingCharge, PersistenceError, ShippingCharge};

use super::poisoned;

/// Shipping charges, at most one per source shipment.
///
/// `create` refuses a second charge for the same shipment; amounts are only
/// changed through [`InMemoryChargeStore::price`], which stands in for the
/// pricing calculator.
#[derive(Debug, Default)]
pub struct InMemoryChargeStore {
    charges: RwLock<HashMap<ChargeId, ShippingCharge>>,
}

impl InMemoryChargeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the amount of the charge sourced from `shipment`.
    pub fn price(&self, shipment: ShipmentId, amount: i64) -> Result<(), PersistenceError> {
        let mut charges = self.charges.write().map_err(|_| poisoned("charges"))?;
        let charge = charges
            .values_mut()
            .find(|c| c.source == shipment)
            .ok_or_else(|| PersistenceError::NotFound(format!("charge for shipment {shipment}")))?;
        charge.amount = amount;
        Ok(())
    }

    pub fn for_order(&self, order: OrderId) -> Result<Vec<ShippingCharge>, PersistenceError> {
        let charges = self.charges.read().map_err(|_| poisoned("charges"))?;
        Ok(charges
            .values()
            .filter(|c| c.order_id == order)
            .cloned()
            .collect())
    }

    pub fn count_for(&self, shipment: ShipmentId) -> Result<usize, PersistenceError> {
        let charges = self.charges.read().map_err(|_| poisoned("charges"))?;
        Ok(charges.values().filter(|c| c.source == shipment).count())
    }
}

impl ChargeStore for InMemoryChargeStore {
    fn find_by_source(&self, shipment: ShipmentId) -> Result<Option<ShippingCharge>, PersistenceError> {
        let charges = self.charges.read().map_err(|_| poisoned("charges"))?;
        Ok(charges.values().find(|c| c.source == shipment).cloned())
    }

    fn create(&self, charge: NewShippingCharge) -> Result<ShippingCharge, PersistenceError> {
        let mut charges = self.charges.write().map_err(|_| poisoned("charges"))?;
        if charges.values().any(|c| c.source == charge.source) {
            return Err(PersistenceError::Conflict(format!(
                "shipment {} already has a shipping charge",
                charge.source
            )));
        }
        let created = ShippingCharge {
            id: ChargeId::new(),
            order_id: charge.order_id,
            description: charge.description,
            amount: 0,
            source: charge.source,
        };
        charges.insert(created.id, created.clone());
        Ok(created)
    }

    fn update_description(&self, charge: ChargeId, description: &str) -> Result<(), PersistenceError> {
        let mut charges = self.charges.write().map_err(|_| poisoned("charges"))?;
        let stored = charges
            .get_mut(&charge)
            .ok_or_else(|| PersistenceError::NotFound(format!("charge {charge}")))?;
        stored.description = description.to_string();
        Ok(())
    }
}
