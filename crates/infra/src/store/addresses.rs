use std::collections::HashMap;
use std::sync::RwLock;

use shipkit_core::AddressId;
use shipkit_shipping::{Address, AddressBook, PersistenceError};

use super::poisoned;

#[derive(Debug, Default)]
pub struct InMemoryAddressBook {
    addresses: RwLock<HashMap<AddressId, Address>>,
}

impl InMemoryAddressBook {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AddressBook for InMemoryAddressBook {
    fn find(&self, id: AddressId) -> Result<Option<Address>, PersistenceError> {
        let addresses = self.addresses.read().map_err(|_| poisoned("addresses"))?;
        Ok(addresses.get(&id).cloned())
    }

    fn upsert(&self, address: &Address) -> Result<(), PersistenceError> {
        let mut addresses = self.addresses.write().map_err(|_| poisoned("addresses"))?;
        addresses.insert(address.id, address.clone());
        Ok(())
    }
}
