//! Deciding when a shipment change invalidates order totals, and pushing the
//! recalculation through to the order.

use crate::charge::ShippingChargeManager;
use crate::error::{Cascade, CascadeStep, PersistenceError, ShipmentError};
use crate::model::ShippingCharge;
use crate::ports::{AddressBook, Order, ShippingContext};
use crate::shipment::Shipment;

/// True when tracked fields changed since load, or the in-memory address no
/// longer matches the stored one. Reads only.
pub fn needs_recalculation(
    shipment: &Shipment,
    addresses: &dyn AddressBook,
) -> Result<bool, PersistenceError> {
    if shipment.is_changed() {
        return Ok(true);
    }
    let Some(address) = shipment.address() else {
        return Ok(false);
    };
    match addresses.find(address.id)? {
        Some(stored) => Ok(!address.same_as(&stored)),
        None => Ok(true),
    }
}

/// Refresh the charge description, then update adjustments, totals and save
/// the order, in that order. Not transactional: a failing step is reported
/// with the steps already done.
pub fn recalculate(
    shipment: &Shipment,
    order: &mut dyn Order,
    ctx: &ShippingContext<'_>,
) -> Result<Option<ShippingCharge>, ShipmentError> {
    let shipment_id = shipment.id_typed();
    let manager = ShippingChargeManager::new(ctx.charges, &ctx.settings.charge_label);
    let mut cascade = Cascade::new();

    let synced = cascade.step(CascadeStep::ChargeDescriptionRefreshed, || {
        manager.sync(shipment_id, shipment.order_id(), shipment.shipping_method())
    })?;
    cascade.step(CascadeStep::OrderAdjustmentsUpdated, || order.update_adjustments())?;
    cascade.step(CascadeStep::OrderTotalsUpdated, || order.update_totals())?;
    cascade.step(CascadeStep::OrderSaved, || order.save())?;

    tracing::info!(
        shipment = %shipment_id,
        order = %shipment.order_id(),
        steps = cascade.completed().len(),
        "order recalculated"
    );
    Ok(synced.into_charge())
}
