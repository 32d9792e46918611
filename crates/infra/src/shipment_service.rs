//! Shipment persistence pipeline (application-level orchestration).
//!
//! Shipments expose explicit lifecycle hooks instead of framework callbacks;
//! this service is the caller that runs them in order around each write:
//!
//! ```text
//! create:  before_create → validate → save → after_save → after_create
//!                                              (→ save → after_save if it advanced)
//!          a rejected first save gives the claimed number back
//! update:  needs_recalculation? → validate → save → after_save → recalculate
//! fire:    fire (incl. ship cascade) → save → after_save
//! destroy: delete → after_destroy
//! ```
//!
//! Every save writes the shipment's address through to the address book.
//! The service holds no state of its own; it composes the stores.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use shipkit_core::ShipmentId;
use shipkit_events::Event;
use shipkit_shipping::{
    AddressBook, ChargeStore, InventoryUnitStore, Order, PersistenceError, Shipment, ShipmentError,
    ShipmentNumber, ShipmentNumberRegistry, ShipmentTransition, ShippingContext, ShippingSettings,
    StateChange,
};

use crate::store::{InMemoryShipmentStore, ShipmentRepository};

pub struct ShipmentService {
    shipments: Arc<InMemoryShipmentStore>,
    charges: Arc<dyn ChargeStore>,
    inventory: Arc<dyn InventoryUnitStore>,
    addresses: Arc<dyn AddressBook>,
    settings: ShippingSettings,
}

impl ShipmentService {
    pub fn new(
        shipments: Arc<InMemoryShipmentStore>,
        charges: Arc<dyn ChargeStore>,
        inventory: Arc<dyn InventoryUnitStore>,
        addresses: Arc<dyn AddressBook>,
        settings: ShippingSettings,
    ) -> Self {
        Self {
            shipments,
            charges,
            inventory,
            addresses,
            settings,
        }
    }

    pub fn context(&self) -> ShippingContext<'_> {
        ShippingContext {
            numbers: self.shipments.as_ref(),
            charges: self.charges.as_ref(),
            inventory: self.inventory.as_ref(),
            addresses: self.addresses.as_ref(),
            settings: &self.settings,
        }
    }

    /// Number, validate, persist, sync the charge, then auto-advance.
    pub fn create(
        &self,
        mut shipment: Shipment,
        order: &mut dyn Order,
        at: DateTime<Utc>,
    ) -> Result<Shipment, ShipmentError> {
        let ctx = self.context();
        shipment.before_create(&ctx)?;
        if let Err(err) = self.persist(&mut shipment, order) {
            if let Err(release_err) = self.abandon_claim(&shipment) {
                tracing::warn!(
                    shipment = %shipment.id_typed(),
                    error = %release_err,
                    "could not release number of rejected shipment"
                );
            }
            return Err(err);
        }

        if let Some(change) = shipment.after_create(order, at)? {
            tracing::debug!(shipment = %change.shipment_id, to = %change.to, "shipment auto-advanced");
            self.persist(&mut shipment, order)?;
        }

        tracing::info!(
            shipment = %shipment.id_typed(),
            order = %shipment.order_id(),
            state = %shipment.state(),
            "shipment created"
        );
        Ok(shipment)
    }

    /// Save edits, recalculating the order when they affect its totals.
    ///
    /// Returns whether a recalculation ran.
    pub fn update(&self, shipment: &mut Shipment, order: &mut dyn Order) -> Result<bool, ShipmentError> {
        let ctx = self.context();
        let recalculate = shipment.needs_recalculation(&ctx)?;
        self.persist(shipment, order)?;
        if recalculate {
            shipment.recalculate(order, &ctx)?;
            self.shipments.save(shipment)?;
        }
        Ok(recalculate)
    }

    /// Fire an event and persist the new state.
    ///
    /// When the ship cascade fails partway the shipment has still moved, so it
    /// is persisted before the cascade error is returned.
    pub fn fire(
        &self,
        shipment: &mut Shipment,
        event: ShipmentTransition,
        order: &mut dyn Order,
        at: DateTime<Utc>,
    ) -> Result<StateChange, ShipmentError> {
        match shipment.fire(event, order, at) {
            Ok(change) => {
                self.persist(shipment, order)?;
                tracing::info!(
                    subject = %change.subject(),
                    event_type = change.event_type(),
                    version = change.version(),
                    "shipment state persisted"
                );
                Ok(change)
            }
            Err(err @ ShipmentError::Cascade { .. }) => {
                self.persist(shipment, order)?;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Delete the record and release its inventory units.
    pub fn destroy(&self, shipment: &mut Shipment) -> Result<(), ShipmentError> {
        self.shipments.delete(shipment.id_typed())?;
        shipment.after_destroy(&self.context())?;
        tracing::info!(shipment = %shipment.id_typed(), "shipment destroyed");
        Ok(())
    }

    pub fn find(&self, id: ShipmentId) -> Result<Option<Shipment>, ShipmentError> {
        Ok(self.shipments.find(id)?)
    }

    /// Look a shipment up by its permalink.
    pub fn find_by_param(&self, param: &str) -> Result<Option<Shipment>, ShipmentError> {
        let number = ShipmentNumber::parse(param)?;
        Ok(self.shipments.find_by_number(&number)?)
    }

    fn persist(&self, shipment: &mut Shipment, order: &dyn Order) -> Result<(), ShipmentError> {
        shipment.validate(order)?;
        if let Some(address) = shipment.address() {
            self.addresses.upsert(address)?;
        }
        self.shipments.save(shipment)?;
        shipment.after_save(&self.context())?;
        // Store the post-save baseline so reloads come back unchanged.
        self.shipments.save(shipment)?;
        Ok(())
    }

    /// Free the number of a shipment whose first save never landed.
    fn abandon_claim(&self, shipment: &Shipment) -> Result<(), PersistenceError> {
        let Some(number) = shipment.number() else {
            return Ok(());
        };
        if self.shipments.find(shipment.id_typed())?.is_none()
            && self.shipments.release(number, shipment.id_typed())?
        {
            tracing::debug!(shipment = %shipment.id_typed(), number = %number, "number released");
        }
        Ok(())
    }
}
