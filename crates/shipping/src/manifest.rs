//! Per-variant summaries of a shipment's inventory, and its release.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use shipkit_core::{InventoryUnitId, ShipmentId, ValueObject, VariantId};

use crate::error::ShipmentError;
use crate::model::{InventoryUnit, LineItem};
use crate::ports::InventoryUnitStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub variant: VariantId,
    pub quantity: usize,
}

impl ValueObject for ManifestEntry {}

/// Group units by variant. Entries come out in first-seen order.
pub fn manifest(units: &[InventoryUnit]) -> Vec<ManifestEntry> {
    let mut index: HashMap<VariantId, usize> = HashMap::new();
    let mut entries: Vec<ManifestEntry> = Vec::new();

    for unit in units {
        match index.get(&unit.variant_id) {
            Some(&pos) => {
                if let Some(entry) = entries.get_mut(pos) {
                    entry.quantity += 1;
                }
            }
            None => {
                index.insert(unit.variant_id, entries.len());
                entries.push(ManifestEntry {
                    variant: unit.variant_id,
                    quantity: 1,
                });
            }
        }
    }

    entries
}

/// The order's line items relevant to this shipment.
///
/// Before checkout completes, inventory is not yet allocated, so every line
/// item is returned.
pub fn line_items(
    checkout_complete: bool,
    order_items: &[LineItem],
    units: &[InventoryUnit],
) -> Vec<LineItem> {
    if !checkout_complete {
        return order_items.to_vec();
    }
    let allocated: HashSet<VariantId> = units.iter().map(|u| u.variant_id).collect();
    order_items
        .iter()
        .filter(|li| allocated.contains(&li.variant_id))
        .cloned()
        .collect()
}

/// Detach every unit still associated with `shipment`.
///
/// Units are detached one by one. A failure stops the loop and reports which
/// units were already detached; those stay detached.
pub fn release(
    store: &dyn InventoryUnitStore,
    shipment: ShipmentId,
) -> Result<Vec<InventoryUnitId>, ShipmentError> {
    let units = store.units_for_shipment(shipment)?;
    let mut released: Vec<InventoryUnitId> = Vec::with_capacity(units.len());

    for (pos, unit) in units.iter().enumerate() {
        if let Err(source) = store.detach(unit.id) {
            let pending = units.iter().skip(pos).map(|u| u.id).collect::<Vec<_>>();
            tracing::warn!(
                shipment = %shipment,
                released = released.len(),
                pending = pending.len(),
                error = %source,
                "inventory release stopped partway"
            );
            return Err(ShipmentError::ReleaseIncomplete {
                released,
                pending,
                source,
            });
        }
        released.push(unit.id);
    }

    tracing::info!(shipment = %shipment, units = released.len(), "inventory units released");
    Ok(released)
}
