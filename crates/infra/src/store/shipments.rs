use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use shipkit_core::{Entity, OrderId, ShipmentId};
use shipkit_shipping::{
    PersistenceError, Shipment, ShipmentNumber, ShipmentNumberRegistry, ShipmentState,
};

use super::poisoned;

/// Storage for shipment records.
pub trait ShipmentRepository: Send + Sync {
    fn save(&self, shipment: &Shipment) -> Result<(), PersistenceError>;

    fn find(&self, id: ShipmentId) -> Result<Option<Shipment>, PersistenceError>;

    fn find_by_number(&self, number: &ShipmentNumber) -> Result<Option<Shipment>, PersistenceError>;

    /// Shipments of one order, in creation order.
    fn for_order(&self, order: OrderId) -> Result<Vec<Shipment>, PersistenceError>;

    /// Remove the record and free its number.
    fn delete(&self, id: ShipmentId) -> Result<Option<Shipment>, PersistenceError>;
}

impl<S> ShipmentRepository for Arc<S>
where
    S: ShipmentRepository + ?Sized,
{
    fn save(&self, shipment: &Shipment) -> Result<(), PersistenceError> {
        (**self).save(shipment)
    }

    fn find(&self, id: ShipmentId) -> Result<Option<Shipment>, PersistenceError> {
        (**self).find(id)
    }

    fn find_by_number(&self, number: &ShipmentNumber) -> Result<Option<Shipment>, PersistenceError> {
        (**self).find_by_number(number)
    }

    fn for_order(&self, order: OrderId) -> Result<Vec<Shipment>, PersistenceError> {
        (**self).for_order(order)
    }

    fn delete(&self, id: ShipmentId) -> Result<Option<Shipment>, PersistenceError> {
        (**self).delete(id)
    }
}

/// Shipment records plus the unique index on their numbers.
///
/// The number index doubles as the `ShipmentNumberRegistry`: a claim is a
/// single insert under the write lock, so two creators can never hold the
/// same number.
#[derive(Debug, Default)]
pub struct InMemoryShipmentStore {
    records: RwLock<Vec<Shipment>>,
    numbers: RwLock<HashMap<ShipmentNumber, ShipmentId>>,
}

impl InMemoryShipmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn states_for_order(&self, order: OrderId) -> Result<Vec<(ShipmentId, ShipmentState)>, PersistenceError> {
        Ok(self
            .for_order(order)?
            .iter()
            .map(|s| (s.id_typed(), s.state()))
            .collect())
    }

    pub fn len(&self) -> Result<usize, PersistenceError> {
        let records = self.records.read().map_err(|_| poisoned("shipments"))?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool, PersistenceError> {
        Ok(self.len()? == 0)
    }
}

impl ShipmentRepository for InMemoryShipmentStore {
    fn save(&self, shipment: &Shipment) -> Result<(), PersistenceError> {
        if let Some(number) = shipment.number() {
            let numbers = self.numbers.read().map_err(|_| poisoned("shipment numbers"))?;
            match numbers.get(number) {
                Some(owner) if *owner != shipment.id_typed() => {
                    return Err(PersistenceError::Conflict(format!(
                        "shipment number {number} already taken"
                    )));
                }
                Some(_) => {}
                None => {
                    return Err(PersistenceError::Conflict(format!(
                        "shipment number {number} was never claimed"
                    )));
                }
            }
        }

        let mut records = self.records.write().map_err(|_| poisoned("shipments"))?;
        match records.iter_mut().find(|s| s.is_same(shipment)) {
            Some(existing) => *existing = shipment.clone(),
            None => records.push(shipment.clone()),
        }
        Ok(())
    }

    fn find(&self, id: ShipmentId) -> Result<Option<Shipment>, PersistenceError> {
        let records = self.records.read().map_err(|_| poisoned("shipments"))?;
        Ok(records.iter().find(|s| s.id_typed() == id).cloned())
    }

    fn find_by_number(&self, number: &ShipmentNumber) -> Result<Option<Shipment>, PersistenceError> {
        let owner = {
            let numbers = self.numbers.read().map_err(|_| poisoned("shipment numbers"))?;
            numbers.get(number).copied()
        };
        match owner {
            Some(id) => self.find(id),
            None => Ok(None),
        }
    }

    fn for_order(&self, order: OrderId) -> Result<Vec<Shipment>, PersistenceError> {
        let records = self.records.read().map_err(|_| poisoned("shipments"))?;
        Ok(records
            .iter()
            .filter(|s| s.order_id() == order)
            .cloned()
            .collect())
    }

    fn delete(&self, id: ShipmentId) -> Result<Option<Shipment>, PersistenceError> {
        let removed = {
            let mut records = self.records.write().map_err(|_| poisoned("shipments"))?;
            let pos = records.iter().position(|s| s.id_typed() == id);
            pos.map(|p| records.remove(p))
        };
        if let Some(number) = removed.as_ref().and_then(|s| s.number()) {
            let mut numbers = self.numbers.write().map_err(|_| poisoned("shipment numbers"))?;
            numbers.remove(number);
        }
        Ok(removed)
    }
}

impl ShipmentNumberRegistry for InMemoryShipmentStore {
    fn claim(&self, number: &ShipmentNumber, shipment: ShipmentId) -> Result<bool, PersistenceError> {
        let mut numbers = self.numbers.write().map_err(|_| poisoned("shipment numbers"))?;
        if numbers.contains_key(number) {
            return Ok(false);
        }
        numbers.insert(number.clone(), shipment);
        Ok(true)
    }

    fn is_taken(&self, number: &ShipmentNumber) -> Result<bool, PersistenceError> {
        let numbers = self.numbers.read().map_err(|_| poisoned("shipment numbers"))?;
        Ok(numbers.contains_key(number))
    }

    fn release(&self, number: &ShipmentNumber, shipment: ShipmentId) -> Result<bool, PersistenceError> {
        let mut numbers = self.numbers.write().map_err(|_| poisoned("shipment numbers"))?;
        if numbers.get(number) != Some(&shipment) {
            return Ok(false);
        }
        numbers.remove(number);
        Ok(true)
    }
}
