//! Collaborator records the shipment reads from: addresses, zones, shipping
//! methods, inventory units, line items and the shipping charge adjustment.

use serde::{Deserialize, Serialize};

use shipkit_core::{
    AddressId, ChargeId, Entity, InventoryUnitId, LineItemId, OrderId, ShipmentId,
    ShippingMethodId, ValueObject, VariantId, ZoneId,
};

/// Lifecycle state of the owning order, as far as shipments care about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    InProgress,
    New,
    Paid,
    CreditOwed,
    BalanceDue,
    Shipped,
    Returned,
    Canceled,
}

impl OrderState {
    /// Orders still being built (or abandoned) may carry shipments with no
    /// allocated inventory.
    pub fn requires_inventory_units(self) -> bool {
        !matches!(self, OrderState::InProgress | OrderState::Canceled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub firstname: String,
    pub lastname: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub zipcode: String,
    pub phone: String,
    /// State/province code, when the country has them.
    pub state: Option<String>,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
}

impl Address {
    /// Compare the postal content of two addresses, ignoring their identity.
    pub fn same_as(&self, other: &Address) -> bool {
        self.firstname == other.firstname
            && self.lastname == other.lastname
            && self.address1 == other.address1
            && self.address2 == other.address2
            && self.city == other.city
            && self.zipcode == other.zipcode
            && self.phone == other.phone
            && self.state == other.state
            && self.country == other.country
    }
}

/// A single rule of zone membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ZoneMember {
    Country { country: String },
    State { country: String, state: String },
}

impl ValueObject for ZoneMember {}

impl ZoneMember {
    fn matches(&self, address: &Address) -> bool {
        match self {
            ZoneMember::Country { country } => country.eq_ignore_ascii_case(&address.country),
            ZoneMember::State { country, state } => {
                country.eq_ignore_ascii_case(&address.country)
                    && address
                        .state
                        .as_deref()
                        .is_some_and(|s| s.eq_ignore_ascii_case(state))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub members: Vec<ZoneMember>,
}

impl Zone {
    pub fn includes(&self, address: &Address) -> bool {
        self.members.iter().any(|m| m.matches(address))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingMethod {
    pub id: ShippingMethodId,
    pub name: String,
    pub zone: Zone,
}

/// A single allocated item instance.
///
/// Owned by the order; the shipment association is cleared (never the unit
/// deleted) when the shipment goes away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryUnit {
    pub id: InventoryUnitId,
    pub order_id: OrderId,
    pub variant_id: VariantId,
    pub shipment_id: Option<ShipmentId>,
}

impl Entity for InventoryUnit {
    type Id = InventoryUnitId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub variant_id: VariantId,
    pub quantity: u32,
    /// Price in smallest currency unit (e.g., cents).
    pub price: i64,
}

/// Shipping cost adjustment attributed to an order and sourced from a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingCharge {
    pub id: ChargeId,
    pub order_id: OrderId,
    pub description: String,
    /// Amount in smallest currency unit. Owned by the pricing collaborator.
    pub amount: i64,
    pub source: ShipmentId,
}

impl Entity for ShippingCharge {
    type Id = ChargeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Fields supplied when a charge is first created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShippingCharge {
    pub order_id: OrderId,
    pub description: String,
    pub source: ShipmentId,
}
