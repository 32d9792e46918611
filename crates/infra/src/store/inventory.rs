use std::collections::HashMap;
use std::sync::RwLock;

use shipkit_core::{InventoryUnitId, OrderId, ShipmentId};
use shipkit_shipping::{InventoryUnit, InventoryUnitStore, PersistenceError};

use super::poisoned;

#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    units: RwLock<HashMap<InventoryUnitId, InventoryUnit>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, unit: InventoryUnit) -> Result<(), PersistenceError> {
        let mut units = self.units.write().map_err(|_| poisoned("inventory units"))?;
        units.insert(unit.id, unit);
        Ok(())
    }

    pub fn get(&self, id: InventoryUnitId) -> Result<Option<InventoryUnit>, PersistenceError> {
        let units = self.units.read().map_err(|_| poisoned("inventory units"))?;
        Ok(units.get(&id).cloned())
    }

    pub fn for_order(&self, order: OrderId) -> Result<Vec<InventoryUnit>, PersistenceError> {
        let units = self.units.read().map_err(|_| poisoned("inventory units"))?;
        Ok(units
            .values()
            .filter(|u| u.order_id == order)
            .cloned()
            .collect())
    }
}

impl InventoryUnitStore for InMemoryInventoryStore {
    fn units_for_shipment(&self, shipment: ShipmentId) -> Result<Vec<InventoryUnit>, PersistenceError> {
        let units = self.units.read().map_err(|_| poisoned("inventory units"))?;
        Ok(units
            .values()
            .filter(|u| u.shipment_id == Some(shipment))
            .cloned()
            .collect())
    }

    fn detach(&self, unit: InventoryUnitId) -> Result<(), PersistenceError> {
        let mut units = self.units.write().map_err(|_| poisoned("inventory units"))?;
        let stored = units
            .get_mut(&unit)
            .ok_or_else(|| PersistenceError::NotFound(format!("inventory unit {unit}")))?;
        stored.shipment_id = None;
        Ok(())
    }
}
