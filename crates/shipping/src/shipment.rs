//! The shipment entity and its explicit lifecycle hooks.
//!
//! Nothing here runs implicitly. The orchestrating caller drives a shipment
//! through:
//!
//! 1. `before_create`: assign the shipment number
//! 2. `validate`: before every save
//! 3. persist
//! 4. `after_create`: auto-advance to `ready_to_ship` when the order allows
//! 5. `after_save`: synchronise the shipping charge, reset change tracking
//! 6. `after_destroy`: release inventory units

use chrono::{DateTime, Utc};
use rand::Rng;

use shipkit_core::{AddressId, DomainResult, Entity, OrderId, ShipmentId, ShippingMethodId};

use crate::charge::{ChargeSync, ShippingChargeManager};
use crate::error::{Cascade, CascadeStep, PersistenceError, ShipmentError};
use crate::manifest::{self, ManifestEntry};
use crate::model::{Address, InventoryUnit, LineItem, ShippingCharge, ShippingMethod};
use crate::number::{self, ShipmentNumber};
use crate::ports::{ChargeStore, Order, ShippingContext};
use crate::state::{ShipmentState, ShipmentTransition, StateChange};
use crate::{recalc, validation};

/// Fields whose change since load makes the order's totals stale.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TrackedFields {
    number: Option<ShipmentNumber>,
    state: ShipmentState,
    shipped_at: Option<DateTime<Utc>>,
    order_id: OrderId,
    shipping_method_id: Option<ShippingMethodId>,
    address_id: Option<AddressId>,
}

/// Persisted fields of a shipment, as loaded from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentRecord {
    pub id: ShipmentId,
    pub order_id: OrderId,
    pub number: ShipmentNumber,
    pub state: ShipmentState,
    pub shipped_at: Option<DateTime<Utc>>,
    pub shipping_method: Option<ShippingMethod>,
    pub address: Option<Address>,
    pub inventory_units: Vec<InventoryUnit>,
}

impl ShipmentRecord {
    /// A record with no method, address or units.
    pub fn new(id: ShipmentId, order_id: OrderId, number: ShipmentNumber, state: ShipmentState) -> Self {
        Self {
            id,
            order_id,
            number,
            state,
            shipped_at: None,
            shipping_method: None,
            address: None,
            inventory_units: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shipment {
    id: ShipmentId,
    number: Option<ShipmentNumber>,
    state: ShipmentState,
    shipped_at: Option<DateTime<Utc>>,
    /// Transient; never part of the persisted record.
    special_instructions: Option<String>,
    order_id: OrderId,
    shipping_method: Option<ShippingMethod>,
    address: Option<Address>,
    inventory_units: Vec<InventoryUnit>,
    charge: Option<ShippingCharge>,
    history: Vec<StateChange>,
    persisted: Option<TrackedFields>,
}

impl Shipment {
    /// A new, unsaved shipment in `pending`.
    pub fn new(id: ShipmentId, order_id: OrderId) -> Self {
        Self {
            id,
            number: None,
            state: ShipmentState::Pending,
            shipped_at: None,
            special_instructions: None,
            order_id,
            shipping_method: None,
            address: None,
            inventory_units: Vec::new(),
            charge: None,
            history: Vec::new(),
            persisted: None,
        }
    }

    /// Rebuild a shipment from storage; it starts out unchanged.
    ///
    /// The baseline covers every field of `record`, so anything attached
    /// afterwards with a `with_*` builder counts as an edit.
    pub fn restore(record: ShipmentRecord) -> Self {
        let mut shipment = Self::new(record.id, record.order_id);
        shipment.number = Some(record.number);
        shipment.state = record.state;
        shipment.shipped_at = record.shipped_at;
        shipment.shipping_method = record.shipping_method;
        shipment.address = record.address;
        shipment.inventory_units = record.inventory_units;
        shipment.mark_persisted();
        shipment
    }

    pub fn with_shipping_method(mut self, method: ShippingMethod) -> Self {
        self.shipping_method = Some(method);
        self
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_inventory_units(mut self, units: Vec<InventoryUnit>) -> Self {
        self.inventory_units = units;
        self
    }

    pub fn id_typed(&self) -> ShipmentId {
        self.id
    }

    pub fn number(&self) -> Option<&ShipmentNumber> {
        self.number.as_ref()
    }

    pub fn state(&self) -> ShipmentState {
        self.state
    }

    pub fn shipped_at(&self) -> Option<DateTime<Utc>> {
        self.shipped_at
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn shipping_method(&self) -> Option<&ShippingMethod> {
        self.shipping_method.as_ref()
    }

    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn inventory_units(&self) -> &[InventoryUnit] {
        &self.inventory_units
    }

    pub fn special_instructions(&self) -> Option<&str> {
        self.special_instructions.as_deref()
    }

    /// State changes fired on this instance, oldest first.
    pub fn history(&self) -> &[StateChange] {
        &self.history
    }

    /// The synchronised shipping charge, as of the last save.
    pub fn charge(&self) -> Option<&ShippingCharge> {
        self.charge.as_ref()
    }

    pub fn is_shipped(&self) -> bool {
        self.state == ShipmentState::Shipped
    }

    pub fn is_editable(&self) -> bool {
        !self.is_shipped()
    }

    pub fn set_shipping_method(&mut self, method: Option<ShippingMethod>) {
        self.shipping_method = method;
    }

    pub fn set_address(&mut self, address: Option<Address>) {
        self.address = address;
    }

    pub fn set_special_instructions(&mut self, instructions: Option<String>) {
        self.special_instructions = instructions;
    }

    pub fn allocate(&mut self, unit: InventoryUnit) {
        self.inventory_units.push(unit);
    }

    /// Record the ship time. Only the first `true` while unset takes effect.
    pub fn set_shipped(&mut self, shipped: bool, at: DateTime<Utc>) {
        if shipped && self.shipped_at.is_none() {
            self.shipped_at = Some(at);
        }
    }

    /// Whether tracked fields differ from what was last persisted.
    ///
    /// A shipment that was never persisted counts as changed.
    pub fn is_changed(&self) -> bool {
        self.persisted.as_ref() != Some(&self.tracked())
    }

    /// Snapshot the tracked fields as the persisted baseline.
    pub fn mark_persisted(&mut self) {
        self.persisted = Some(self.tracked());
    }

    fn tracked(&self) -> TrackedFields {
        TrackedFields {
            number: self.number.clone(),
            state: self.state,
            shipped_at: self.shipped_at,
            order_id: self.order_id,
            shipping_method_id: self.shipping_method.as_ref().map(|m| m.id),
            address_id: self.address.as_ref().map(|a| a.id),
        }
    }

    // ---------------------------------------------------------------------
    // Identifier
    // ---------------------------------------------------------------------

    /// The shipment number, generating and claiming one if absent.
    pub fn ensure_number(&mut self, ctx: &ShippingContext<'_>) -> Result<&ShipmentNumber, ShipmentError> {
        self.ensure_number_with(&mut rand::thread_rng(), ctx)
    }

    pub fn ensure_number_with<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        ctx: &ShippingContext<'_>,
    ) -> Result<&ShipmentNumber, ShipmentError> {
        let number = match self.number.take() {
            Some(existing) => existing,
            None => {
                let generated = number::generate(rng, ctx.numbers, self.id, ctx.settings)?;
                tracing::info!(shipment = %self.id, number = %generated, "shipment number assigned");
                generated
            }
        };
        Ok(&*self.number.insert(number))
    }

    /// Permalink form of the number. Generates a number if absent.
    pub fn to_param(&mut self, ctx: &ShippingContext<'_>) -> Result<String, ShipmentError> {
        Ok(self.ensure_number(ctx)?.to_param())
    }

    // ---------------------------------------------------------------------
    // State machine
    // ---------------------------------------------------------------------

    /// Fire a lifecycle event.
    ///
    /// An event not permitted from the current state fails with
    /// `InvalidTransition` and changes nothing. Entering `shipped` records
    /// `shipped_at` and ships the order once every sibling shipment is
    /// shipped; a failure there is reported with the steps already done.
    pub fn fire(
        &mut self,
        event: ShipmentTransition,
        order: &mut dyn Order,
        at: DateTime<Utc>,
    ) -> Result<StateChange, ShipmentError> {
        let from = self.state;
        let to = event.apply(from)?;

        let change = StateChange {
            shipment_id: self.id,
            event,
            from,
            to,
            occurred_at: at,
        };
        self.state = to;
        self.history.push(change.clone());
        tracing::info!(
            shipment = %self.id,
            order = %self.order_id,
            event = %event,
            from = %from,
            to = %to,
            "shipment transitioned"
        );

        if to == ShipmentState::Shipped {
            self.cascade_shipped(order, at)?;
        }

        Ok(change)
    }

    fn cascade_shipped(&mut self, order: &mut dyn Order, at: DateTime<Utc>) -> Result<(), ShipmentError> {
        let mut cascade = Cascade::new();
        cascade.mark(CascadeStep::Transitioned);

        self.set_shipped(true, at);
        cascade.mark(CascadeStep::ShippedAtRecorded);

        let siblings = cascade.step(CascadeStep::SiblingsInspected, || order.shipment_states())?;
        let all_shipped = siblings
            .iter()
            .all(|(id, state)| *id == self.id || *state == ShipmentState::Shipped);

        if all_shipped {
            cascade.step(CascadeStep::OrderShipped, || order.ship())?;
            tracing::info!(shipment = %self.id, order = %self.order_id, "all shipments shipped; order shipped");
        } else {
            tracing::debug!(shipment = %self.id, order = %self.order_id, "order still has unshipped shipments");
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Lifecycle hooks
    // ---------------------------------------------------------------------

    pub fn before_create(&mut self, ctx: &ShippingContext<'_>) -> Result<(), ShipmentError> {
        self.ensure_number(ctx).map(|_| ())
    }

    /// Advance straight to `ready_to_ship` when checkout is complete and
    /// nothing is owed.
    pub fn after_create(
        &mut self,
        order: &mut dyn Order,
        at: DateTime<Utc>,
    ) -> Result<Option<StateChange>, ShipmentError> {
        if self.state == ShipmentState::Pending
            && order.checkout_complete()
            && !order.has_outstanding_balance()
        {
            return self.fire(ShipmentTransition::Ready, order, at).map(Some);
        }
        Ok(None)
    }

    pub fn validate(&self, order: &dyn Order) -> DomainResult<()> {
        validation::validate(self, order.state())
    }

    /// Synchronise the shipping charge and take a new change-tracking baseline.
    pub fn after_save(&mut self, ctx: &ShippingContext<'_>) -> Result<ChargeSync, ShipmentError> {
        let manager = ShippingChargeManager::new(ctx.charges, &ctx.settings.charge_label);
        let synced = manager.sync(self.id, self.order_id, self.shipping_method.as_ref())?;
        if let Some(charge) = synced.charge() {
            self.charge = Some(charge.clone());
        }
        self.mark_persisted();
        Ok(synced)
    }

    /// Release inventory units. Partial progress is reported, not undone.
    pub fn after_destroy(&mut self, ctx: &ShippingContext<'_>) -> Result<(), ShipmentError> {
        manifest::release(ctx.inventory, self.id)?;
        for unit in &mut self.inventory_units {
            unit.shipment_id = None;
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Current charge amount, read fresh from the charge store.
    pub fn cost(&self, charges: &dyn ChargeStore) -> Result<Option<i64>, PersistenceError> {
        Ok(charges.find_by_source(self.id)?.map(|c| c.amount))
    }

    pub fn manifest(&self) -> Vec<ManifestEntry> {
        manifest::manifest(&self.inventory_units)
    }

    pub fn line_items(&self, order: &dyn Order) -> Vec<LineItem> {
        manifest::line_items(order.checkout_complete(), order.line_items(), &self.inventory_units)
    }

    pub fn needs_recalculation(&self, ctx: &ShippingContext<'_>) -> Result<bool, PersistenceError> {
        recalc::needs_recalculation(self, ctx.addresses)
    }

    pub fn recalculate(&mut self, order: &mut dyn Order, ctx: &ShippingContext<'_>) -> Result<(), ShipmentError> {
        let charge = recalc::recalculate(self, order, ctx)?;
        if charge.is_some() {
            self.charge = charge;
        }
        Ok(())
    }
}

impl Entity for Shipment {
    type Id = ShipmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
