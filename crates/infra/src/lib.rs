//! Infrastructure layer: stores, the order collaborator, orchestration.

pub mod order;
pub mod shipment_service;
pub mod store;


pub use order::{InMemoryOrder, OrderCalls};
pub use shipment_service::ShipmentService;
pub use store::{
    InMemoryAddressBook, InMemoryChargeStore, InMemoryInventoryStore, InMemoryShipmentStore,
    ShipmentRepository,
};
