//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects carry no identity of their own; two values with the same
/// attributes are interchangeable. In this workspace that covers manifest
/// entries, zone membership rules and the address fields compared when
/// deciding whether an order needs recalculating.
///
/// - **Value Object**: a manifest entry `{ variant, quantity: 3 }`
/// - **Entity**: a `Shipment { id: ShipmentId(...), .. }`
///
/// To "modify" a value object, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
