//! In-memory order collaborator.
//!
//! Implements just enough of an order for shipments to hand off to: totals
//! are recomputed from line items and stored shipping charges, and shipping
//! the order moves it to `shipped`.

use std::sync::Arc;

use shipkit_core::{OrderId, ShipmentId};
use shipkit_shipping::{LineItem, Order, OrderState, PersistenceError, ShipmentState};

use crate::store::{InMemoryChargeStore, InMemoryShipmentStore};

/// Counts of the hand-offs the order has received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderCalls {
    pub ship: u32,
    pub update_adjustments: u32,
    pub update_totals: u32,
    pub save: u32,
}

#[derive(Debug)]
pub struct InMemoryOrder {
    id: OrderId,
    state: OrderState,
    checkout_complete: bool,
    line_items: Vec<LineItem>,
    item_total: i64,
    adjustment_total: i64,
    total: i64,
    payment_total: i64,
    calls: OrderCalls,
    shipments: Arc<InMemoryShipmentStore>,
    charges: Arc<InMemoryChargeStore>,
}

impl InMemoryOrder {
    pub fn new(
        id: OrderId,
        shipments: Arc<InMemoryShipmentStore>,
        charges: Arc<InMemoryChargeStore>,
    ) -> Self {
        Self {
            id,
            state: OrderState::InProgress,
            checkout_complete: false,
            line_items: Vec::new(),
            item_total: 0,
            adjustment_total: 0,
            total: 0,
            payment_total: 0,
            calls: OrderCalls::default(),
            shipments,
            charges,
        }
    }

    pub fn with_line_items(mut self, line_items: Vec<LineItem>) -> Self {
        self.line_items = line_items;
        self.item_total = self.compute_item_total();
        self.total = self.item_total + self.adjustment_total;
        self
    }

    /// Finish checkout, recording `payment` against the current total.
    pub fn complete_checkout(&mut self, payment: i64) {
        self.checkout_complete = true;
        self.payment_total = payment;
        self.state = if self.has_outstanding_balance() {
            OrderState::BalanceDue
        } else {
            OrderState::Paid
        };
    }

    pub fn calls(&self) -> OrderCalls {
        self.calls
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn adjustment_total(&self) -> i64 {
        self.adjustment_total
    }

    fn compute_item_total(&self) -> i64 {
        self.line_items
            .iter()
            .map(|li| li.price * i64::from(li.quantity))
            .sum()
    }
}

impl Order for InMemoryOrder {
    fn id(&self) -> OrderId {
        self.id
    }

    fn state(&self) -> OrderState {
        self.state
    }

    fn checkout_complete(&self) -> bool {
        self.checkout_complete
    }

    fn has_outstanding_balance(&self) -> bool {
        self.payment_total < self.total
    }

    fn shipment_states(&self) -> Result<Vec<(ShipmentId, ShipmentState)>, PersistenceError> {
        self.shipments.states_for_order(self.id)
    }

    fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    fn ship(&mut self) -> Result<(), PersistenceError> {
        self.state = OrderState::Shipped;
        self.calls.ship += 1;
        tracing::info!(order = %self.id, "order shipped");
        Ok(())
    }

    fn update_adjustments(&mut self) -> Result<(), PersistenceError> {
        self.adjustment_total = self
            .charges
            .for_order(self.id)?
            .iter()
            .map(|c| c.amount)
            .sum();
        self.calls.update_adjustments += 1;
        Ok(())
    }

    fn update_totals(&mut self) -> Result<(), PersistenceError> {
        self.item_total = self.compute_item_total();
        self.total = self.item_total + self.adjustment_total;
        self.calls.update_totals += 1;
        Ok(())
    }

    fn save(&mut self) -> Result<(), PersistenceError> {
        self.calls.save += 1;
        tracing::debug!(order = %self.id, total = self.total, "order saved");
        Ok(())
    }
}
