//! Shipment lifecycle: states, events and the transition table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shipkit_core::{DomainError, DomainResult, ShipmentId};
use shipkit_events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentState {
    #[default]
    Pending,
    ReadyToShip,
    /// Terminal; a shipped shipment never reopens.
    Shipped,
}

impl ShipmentState {
    pub const ALL: [ShipmentState; 3] = [
        ShipmentState::Pending,
        ShipmentState::ReadyToShip,
        ShipmentState::Shipped,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShipmentState::Pending => "pending",
            ShipmentState::ReadyToShip => "ready_to_ship",
            ShipmentState::Shipped => "shipped",
        }
    }
}

impl core::fmt::Display for ShipmentState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events that can be fired at a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentTransition {
    Ready,
    Pend,
    Ship,
}

impl ShipmentTransition {
    pub const ALL: [ShipmentTransition; 3] = [
        ShipmentTransition::Ready,
        ShipmentTransition::Pend,
        ShipmentTransition::Ship,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShipmentTransition::Ready => "ready",
            ShipmentTransition::Pend => "pend",
            ShipmentTransition::Ship => "ship",
        }
    }

    /// The single `(from, to)` row this event is allowed on.
    pub fn edge(self) -> (ShipmentState, ShipmentState) {
        match self {
            ShipmentTransition::Ready => (ShipmentState::Pending, ShipmentState::ReadyToShip),
            ShipmentTransition::Pend => (ShipmentState::ReadyToShip, ShipmentState::Pending),
            ShipmentTransition::Ship => (ShipmentState::ReadyToShip, ShipmentState::Shipped),
        }
    }

    /// Resolve the target state, or fail without touching anything.
    pub fn apply(self, current: ShipmentState) -> DomainResult<ShipmentState> {
        let (from, to) = self.edge();
        if current == from {
            Ok(to)
        } else {
            Err(DomainError::invalid_transition(self.as_str(), current.as_str()))
        }
    }

    pub fn can_fire(self, current: ShipmentState) -> bool {
        self.edge().0 == current
    }
}

impl core::fmt::Display for ShipmentTransition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event: a shipment moved between lifecycle states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub shipment_id: ShipmentId,
    pub event: ShipmentTransition,
    pub from: ShipmentState,
    pub to: ShipmentState,
    pub occurred_at: DateTime<Utc>,
}

impl Event for StateChange {
    fn event_type(&self) -> &'static str {
        match self.event {
            ShipmentTransition::Ready => "shipping.shipment.readied",
            ShipmentTransition::Pend => "shipping.shipment.pended",
            ShipmentTransition::Ship => "shipping.shipment.shipped",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn subject(&self) -> String {
        self.shipment_id.to_string()
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
