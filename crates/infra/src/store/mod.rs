//! In-memory persistence for shipments and their collaborators.
//!
//! Intended for tests/dev. Every store guards its map with an `RwLock`; a
//! poisoned lock is reported as `PersistenceError::Unavailable`.

pub mod addresses;
pub mod charges;
pub mod inventory;
pub mod shipments;

pub use addresses::InMemoryAddressBook;
pub use charges::InMemoryChargeStore;
pub use inventory::InMemoryInventoryStore;
pub use shipments::{InMemoryShipmentStore, ShipmentRepository};

use shipkit_shipping::PersistenceError;

pub(crate) fn poisoned(store: &str) -> PersistenceError {
    PersistenceError::Unavailable(format!("{store} lock poisoned"))
}
