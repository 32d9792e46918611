//! Shipment lifecycle core.
//!
//! A shipment is the unit of an order's inventory that travels together. This
//! crate owns its state machine, its number, the shipping charge it keeps in
//! sync, its inventory manifest and the order recalculation it triggers.
//! Storage and the order itself are reached only through the traits in
//! [`ports`].

pub mod charge;
pub mod config;
pub mod error;
pub mod manifest;
pub mod model;
pub mod number;
pub mod ports;
pub mod recalc;
pub mod shipment;
pub mod state;
pub mod validation;

#[cfg(test)]
pub(crate) mod fixtures;

pub use charge::{ChargeSync, ShippingChargeManager, description_for};
pub use config::ShippingSettings;
pub use error::{CascadeStep, PersistenceError, ShipmentError};
pub use manifest::ManifestEntry;
pub use model::{
    Address, InventoryUnit, LineItem, NewShippingCharge, OrderState, ShippingCharge,
    ShippingMethod, Zone, ZoneMember,
};
pub use number::ShipmentNumber;
pub use ports::{
    AddressBook, ChargeStore, InventoryUnitStore, Order, ShipmentNumberRegistry, ShippingContext,
};
pub use shipment::{Shipment, ShipmentRecord};
pub use state::{ShipmentState, ShipmentTransition, StateChange};
