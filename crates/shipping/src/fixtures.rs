//! Test doubles for the collaborator ports.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use shipkit_core::{
    AddressId, ChargeId, InventoryUnitId, LineItemId, OrderId, ShipmentId, ShippingMethodId,
    VariantId, ZoneId,
};

use crate::config::ShippingSettings;
use crate::error::PersistenceError;
use crate::model::{
    Address, InventoryUnit, LineItem, NewShippingCharge, OrderState, ShippingCharge,
    ShippingMethod, Zone, ZoneMember,
};
use crate::number::ShipmentNumber;
use crate::ports::{
    AddressBook, ChargeStore, InventoryUnitStore, Order, ShipmentNumberRegistry, ShippingContext,
};
use crate::shipment::Shipment;
use crate::state::ShipmentState;

pub(crate) fn address(country: &str, state: Option<&str>) -> Address {
    Address {
        id: AddressId::new(),
        firstname: "Ada".to_string(),
        lastname: "Lovelace".to_string(),
        address1: "12 St James's Square".to_string(),
        address2: None,
        city: "London".to_string(),
        zipcode: "SW1Y 4JH".to_string(),
        phone: "555-0100".to_string(),
        state: state.map(str::to_string),
        country: country.to_string(),
    }
}

pub(crate) fn shipping_method(name: &str, countries: &[&str]) -> ShippingMethod {
    ShippingMethod {
        id: ShippingMethodId::new(),
        name: name.to_string(),
        zone: Zone {
            id: ZoneId::new(),
            name: format!("{name} zone"),
            members: countries
                .iter()
                .map(|c| ZoneMember::Country {
                    country: c.to_string(),
                })
                .collect(),
        },
    }
}

pub(crate) fn unit(order: OrderId, variant: VariantId, shipment: Option<ShipmentId>) -> InventoryUnit {
    InventoryUnit {
        id: InventoryUnitId::new(),
        order_id: order,
        variant_id: variant,
        shipment_id: shipment,
    }
}

pub(crate) fn line_item(variant: VariantId, quantity: u32) -> LineItem {
    LineItem {
        id: LineItemId::new(),
        variant_id: variant,
        quantity,
        price: 1999,
    }
}

#[derive(Default)]
pub(crate) struct FakeNumbers {
    taken: Mutex<HashMap<ShipmentNumber, ShipmentId>>,
    attempts: Mutex<u32>,
    reject_all: bool,
}

impl FakeNumbers {
    pub(crate) fn always_taken() -> Self {
        Self {
            reject_all: true,
            ..Self::default()
        }
    }

    pub(crate) fn claim_attempts(&self) -> u32 {
        *self.attempts.lock().unwrap()
    }
}

impl ShipmentNumberRegistry for FakeNumbers {
    fn claim(&self, number: &ShipmentNumber, shipment: ShipmentId) -> Result<bool, PersistenceError> {
        *self.attempts.lock().unwrap() += 1;
        if self.reject_all {
            return Ok(false);
        }
        let mut taken = self.taken.lock().unwrap();
        if taken.contains_key(number) {
            return Ok(false);
        }
        taken.insert(number.clone(), shipment);
        Ok(true)
    }

    fn is_taken(&self, number: &ShipmentNumber) -> Result<bool, PersistenceError> {
        Ok(self.reject_all || self.taken.lock().unwrap().contains_key(number))
    }

    fn release(&self, number: &ShipmentNumber, shipment: ShipmentId) -> Result<bool, PersistenceError> {
        let mut taken = self.taken.lock().unwrap();
        if taken.get(number) != Some(&shipment) {
            return Ok(false);
        }
        taken.remove(number);
        Ok(true)
    }
}

#[derive(Default)]
pub(crate) struct FakeCharges {
    charges: Mutex<Vec<ShippingCharge>>,
    description_writes: Mutex<u32>,
}

impl FakeCharges {
    pub(crate) fn count_for(&self, shipment: ShipmentId) -> usize {
        self.charges
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.source == shipment)
            .count()
    }

    pub(crate) fn stored(&self, shipment: ShipmentId) -> Option<ShippingCharge> {
        self.charges
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.source == shipment)
            .cloned()
    }

    /// Stand-in for the pricing collaborator.
    pub(crate) fn set_amount(&self, shipment: ShipmentId, amount: i64) {
        for c in self.charges.lock().unwrap().iter_mut() {
            if c.source == shipment {
                c.amount = amount;
            }
        }
    }

    pub(crate) fn description_writes(&self) -> u32 {
        *self.description_writes.lock().unwrap()
    }
}

impl ChargeStore for FakeCharges {
    fn find_by_source(&self, shipment: ShipmentId) -> Result<Option<ShippingCharge>, PersistenceError> {
        Ok(self.stored(shipment))
    }

    fn create(&self, charge: NewShippingCharge) -> Result<ShippingCharge, PersistenceError> {
        let created = ShippingCharge {
            id: ChargeId::new(),
            order_id: charge.order_id,
            description: charge.description,
            amount: 0,
            source: charge.source,
        };
        self.charges.lock().unwrap().push(created.clone());
        Ok(created)
    }

    fn update_description(&self, charge: ChargeId, description: &str) -> Result<(), PersistenceError> {
        let mut charges = self.charges.lock().unwrap();
        let stored = charges
            .iter_mut()
            .find(|c| c.id == charge)
            .ok_or_else(|| PersistenceError::NotFound(charge.to_string()))?;
        stored.description = description.to_string();
        *self.description_writes.lock().unwrap() += 1;
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeInventory {
    units: Mutex<Vec<InventoryUnit>>,
    detach_budget: Mutex<Option<usize>>,
}

impl FakeInventory {
    pub(crate) fn insert(&self, unit: InventoryUnit) {
        self.units.lock().unwrap().push(unit);
    }

    pub(crate) fn all(&self) -> Vec<InventoryUnit> {
        self.units.lock().unwrap().clone()
    }

    /// Let `n` detaches succeed, then fail every one after.
    pub(crate) fn fail_detach_after(&self, n: usize) {
        *self.detach_budget.lock().unwrap() = Some(n);
    }
}

impl InventoryUnitStore for FakeInventory {
    fn units_for_shipment(&self, shipment: ShipmentId) -> Result<Vec<InventoryUnit>, PersistenceError> {
        Ok(self
            .units
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.shipment_id == Some(shipment))
            .cloned()
            .collect())
    }

    fn detach(&self, unit: InventoryUnitId) -> Result<(), PersistenceError> {
        let mut budget = self.detach_budget.lock().unwrap();
        if let Some(remaining) = budget.as_mut() {
            if *remaining == 0 {
                return Err(PersistenceError::Unavailable("detach failed".to_string()));
            }
            *remaining -= 1;
        }
        for u in self.units.lock().unwrap().iter_mut() {
            if u.id == unit {
                u.shipment_id = None;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeAddresses {
    addresses: Mutex<HashMap<AddressId, Address>>,
}

impl FakeAddresses {
    pub(crate) fn insert(&self, address: Address) {
        self.addresses.lock().unwrap().insert(address.id, address);
    }
}

impl AddressBook for FakeAddresses {
    fn find(&self, id: AddressId) -> Result<Option<Address>, PersistenceError> {
        Ok(self.addresses.lock().unwrap().get(&id).cloned())
    }

    fn upsert(&self, address: &Address) -> Result<(), PersistenceError> {
        self.insert(address.clone());
        Ok(())
    }
}

pub(crate) struct FakeOrder {
    id: OrderId,
    state: OrderState,
    checkout_complete: bool,
    outstanding_balance: bool,
    shipments: Vec<(ShipmentId, ShipmentState)>,
    line_items: Vec<LineItem>,
    calls: Vec<&'static str>,
    failing: HashSet<&'static str>,
}

impl FakeOrder {
    pub(crate) fn new() -> Self {
        Self {
            id: OrderId::new(),
            state: OrderState::New,
            checkout_complete: false,
            outstanding_balance: false,
            shipments: Vec::new(),
            line_items: Vec::new(),
            calls: Vec::new(),
            failing: HashSet::new(),
        }
    }

    /// Mirror a shipment's current state into the order's view.
    pub(crate) fn track(&mut self, shipment: &Shipment) {
        let entry = (shipment.id_typed(), shipment.state());
        match self.shipments.iter_mut().find(|(id, _)| *id == entry.0) {
            Some(existing) => *existing = entry,
            None => self.shipments.push(entry),
        }
    }

    pub(crate) fn set_checkout_complete(&mut self, value: bool) {
        self.checkout_complete = value;
    }

    pub(crate) fn set_outstanding_balance(&mut self, value: bool) {
        self.outstanding_balance = value;
    }

    pub(crate) fn fail_on(&mut self, call: &'static str) {
        self.failing.insert(call);
    }

    pub(crate) fn fail_ship(&mut self) {
        self.fail_on("ship");
    }

    /// Successful mutating calls, in order.
    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.clone()
    }

    pub(crate) fn ship_calls(&self) -> usize {
        self.calls.iter().filter(|c| **c == "ship").count()
    }

    fn record(&mut self, call: &'static str) -> Result<(), PersistenceError> {
        if self.failing.contains(call) {
            return Err(PersistenceError::Unavailable(format!("{call} failed")));
        }
        self.calls.push(call);
        Ok(())
    }
}

impl Order for FakeOrder {
    fn id(&self) -> OrderId {
        self.id
    }

    fn state(&self) -> OrderState {
        self.state
    }

    fn checkout_complete(&self) -> bool {
        self.checkout_complete
    }

    fn has_outstanding_balance(&self) -> bool {
        self.outstanding_balance
    }

    fn shipment_states(&self) -> Result<Vec<(ShipmentId, ShipmentState)>, PersistenceError> {
        Ok(self.shipments.clone())
    }

    fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    fn ship(&mut self) -> Result<(), PersistenceError> {
        self.record("ship")
    }

    fn update_adjustments(&mut self) -> Result<(), PersistenceError> {
        self.record("update_adjustments")
    }

    fn update_totals(&mut self) -> Result<(), PersistenceError> {
        self.record("update_totals")
    }

    fn save(&mut self) -> Result<(), PersistenceError> {
        self.record("save")
    }
}

/// One of each store plus default settings.
pub(crate) struct Fixture {
    pub(crate) numbers: FakeNumbers,
    pub(crate) charges: FakeCharges,
    pub(crate) inventory: FakeInventory,
    pub(crate) addresses: FakeAddresses,
    pub(crate) settings: ShippingSettings,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self {
            numbers: FakeNumbers::default(),
            charges: FakeCharges::default(),
            inventory: FakeInventory::default(),
            addresses: FakeAddresses::default(),
            settings: ShippingSettings::default(),
        }
    }

    pub(crate) fn ctx(&self) -> ShippingContext<'_> {
        ShippingContext {
            numbers: &self.numbers,
            charges: &self.charges,
            inventory: &self.inventory,
            addresses: &self.addresses,
            settings: &self.settings,
        }
    }
}
