//! Collaborator ports the shipment core depends on.
//!
//! Persistence ports take `&self` and are `Send + Sync` so one store can serve
//! many requests; implementations provide their own interior locking. The
//! order is handed in per operation as `&mut dyn Order`.

use std::sync::Arc;

use shipkit_core::{AddressId, ChargeId, InventoryUnitId, OrderId, ShipmentId};

use crate::config::ShippingSettings;
use crate::error::PersistenceError;
use crate::model::{Address, InventoryUnit, LineItem, NewShippingCharge, OrderState, ShippingCharge};
use crate::number::ShipmentNumber;
use crate::state::ShipmentState;

/// The order owning a shipment.
///
/// Its own lifecycle is out of scope here; shipments only read its checkout
/// status and hand off to `ship`, `update_adjustments`, `update_totals` and
/// `save`.
pub trait Order {
    fn id(&self) -> OrderId;

    fn state(&self) -> OrderState;

    fn checkout_complete(&self) -> bool;

    fn has_outstanding_balance(&self) -> bool;

    /// Every shipment belonging to the order, with its persisted state.
    fn shipment_states(&self) -> Result<Vec<(ShipmentId, ShipmentState)>, PersistenceError>;

    fn line_items(&self) -> &[LineItem];

    /// The order's own ship transition.
    fn ship(&mut self) -> Result<(), PersistenceError>;

    fn update_adjustments(&mut self) -> Result<(), PersistenceError>;

    fn update_totals(&mut self) -> Result<(), PersistenceError>;

    fn save(&mut self) -> Result<(), PersistenceError>;
}

/// Storage-side uniqueness for shipment numbers.
pub trait ShipmentNumberRegistry: Send + Sync {
    /// Atomically reserve `number` for `shipment`.
    ///
    /// Returns `Ok(false)` when another shipment already holds it. Must be a
    /// single check-and-insert so concurrent claims cannot both succeed.
    fn claim(&self, number: &ShipmentNumber, shipment: ShipmentId) -> Result<bool, PersistenceError>;

    fn is_taken(&self, number: &ShipmentNumber) -> Result<bool, PersistenceError>;

    /// Give back a number `shipment` claimed but never saved under.
    ///
    /// Returns `Ok(false)` when `shipment` does not hold it.
    fn release(&self, number: &ShipmentNumber, shipment: ShipmentId) -> Result<bool, PersistenceError>;
}

/// Shipping charge adjustments keyed by the shipment that produced them.
pub trait ChargeStore: Send + Sync {
    fn find_by_source(&self, shipment: ShipmentId) -> Result<Option<ShippingCharge>, PersistenceError>;

    fn create(&self, charge: NewShippingCharge) -> Result<ShippingCharge, PersistenceError>;

    /// Update only the description; the amount is never touched.
    fn update_description(&self, charge: ChargeId, description: &str) -> Result<(), PersistenceError>;
}

pub trait InventoryUnitStore: Send + Sync {
    fn units_for_shipment(&self, shipment: ShipmentId) -> Result<Vec<InventoryUnit>, PersistenceError>;

    /// Clear a unit's shipment association, leaving it tied to its order.
    fn detach(&self, unit: InventoryUnitId) -> Result<(), PersistenceError>;
}

/// Persisted addresses, looked up fresh by identifier.
pub trait AddressBook: Send + Sync {
    fn find(&self, id: AddressId) -> Result<Option<Address>, PersistenceError>;

    /// Store `address` under its id, replacing any earlier version.
    fn upsert(&self, address: &Address) -> Result<(), PersistenceError>;
}

impl<S> ShipmentNumberRegistry for Arc<S>
where
    S: ShipmentNumberRegistry + ?Sized,
{
    fn claim(&self, number: &ShipmentNumber, shipment: ShipmentId) -> Result<bool, PersistenceError> {
        (**self).claim(number, shipment)
    }

    fn is_taken(&self, number: &ShipmentNumber) -> Result<bool, PersistenceError> {
        (**self).is_taken(number)
    }

    fn release(&self, number: &ShipmentNumber, shipment: ShipmentId) -> Result<bool, PersistenceError> {
        (**self).release(number, shipment)
    }
}

impl<S> ChargeStore for Arc<S>
where
    S: ChargeStore + ?Sized,
{
    fn find_by_source(&self, shipment: ShipmentId) -> Result<Option<ShippingCharge>, PersistenceError> {
        (**self).find_by_source(shipment)
    }

    fn create(&self, charge: NewShippingCharge) -> Result<ShippingCharge, PersistenceError> {
        (**self).create(charge)
    }

    fn update_description(&self, charge: ChargeId, description: &str) -> Result<(), PersistenceError> {
        (**self).update_description(charge, description)
    }
}

impl<S> InventoryUnitStore for Arc<S>
where
    S: InventoryUnitStore + ?Sized,
{
    fn units_for_shipment(&self, shipment: ShipmentId) -> Result<Vec<InventoryUnit>, PersistenceError> {
        (**self).units_for_shipment(shipment)
    }

    fn detach(&self, unit: InventoryUnitId) -> Result<(), PersistenceError> {
        (**self).detach(unit)
    }
}

impl<S> AddressBook for Arc<S>
where
    S: AddressBook + ?Sized,
{
    fn find(&self, id: AddressId) -> Result<Option<Address>, PersistenceError> {
        (**self).find(id)
    }

    fn upsert(&self, address: &Address) -> Result<(), PersistenceError> {
        (**self).upsert(address)
    }
}

/// Everything a shipment needs from the outside world, borrowed for one
/// operation.
#[derive(Clone, Copy)]
pub struct ShippingContext<'a> {
    pub numbers: &'a dyn ShipmentNumberRegistry,
    pub charges: &'a dyn ChargeStore,
    pub inventory: &'a dyn InventoryUnitStore,
    pub addresses: &'a dyn AddressBook,
    pub settings: &'a ShippingSettings,
}
