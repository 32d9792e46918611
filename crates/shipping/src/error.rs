//! Failures surfaced by shipment operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shipkit_core::{DomainError, InventoryUnitId};

/// Failure reported by a persistence collaborator (stores, order gateway).
///
/// The core never retries these; they are passed through to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("write conflict: {0}")]
    Conflict(String),

    #[error("record not found: {0}")]
    NotFound(String),
}

/// One collaborator call inside a multi-step cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStep {
    Transitioned,
    ShippedAtRecorded,
    SiblingsInspected,
    OrderShipped,
    ChargeDescriptionRefreshed,
    OrderAdjustmentsUpdated,
    OrderTotalsUpdated,
    OrderSaved,
}

impl CascadeStep {
    pub fn as_str(self) -> &'static str {
        match self {
            CascadeStep::Transitioned => "transitioned",
            CascadeStep::ShippedAtRecorded => "shipped_at_recorded",
            CascadeStep::SiblingsInspected => "siblings_inspected",
            CascadeStep::OrderShipped => "order_shipped",
            CascadeStep::ChargeDescriptionRefreshed => "charge_description_refreshed",
            CascadeStep::OrderAdjustmentsUpdated => "order_adjustments_updated",
            CascadeStep::OrderTotalsUpdated => "order_totals_updated",
            CascadeStep::OrderSaved => "order_saved",
        }
    }
}

impl core::fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation-level error for everything a shipment does.
#[derive(Debug, Error)]
pub enum ShipmentError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// A cascade stopped partway. Completed steps are not rolled back.
    #[error("{failed} failed after [{}]: {source}", join_steps(.completed))]
    Cascade {
        completed: Vec<CascadeStep>,
        failed: CascadeStep,
        source: PersistenceError,
    },

    /// Inventory release stopped partway. Released units stay detached.
    #[error(
        "released {} inventory unit(s), {} still attached: {source}",
        .released.len(),
        .pending.len()
    )]
    ReleaseIncomplete {
        released: Vec<InventoryUnitId>,
        pending: Vec<InventoryUnitId>,
        source: PersistenceError,
    },
}

impl ShipmentError {
    /// Domain error, if this is one.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            ShipmentError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

fn join_steps(steps: &[CascadeStep]) -> String {
    steps
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Tracks which steps of a cascade have completed so a failure can report them.
#[derive(Debug, Default)]
pub(crate) struct Cascade {
    completed: Vec<CascadeStep>,
}

impl Cascade {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a step that cannot fail (in-memory mutation).
    pub(crate) fn mark(&mut self, step: CascadeStep) {
        self.completed.push(step);
    }

    /// Run one collaborator call as the next step of the cascade.
    pub(crate) fn step<T>(
        &mut self,
        step: CascadeStep,
        call: impl FnOnce() -> Result<T, PersistenceError>,
    ) -> Result<T, ShipmentError> {
        match call() {
            Ok(value) => {
                self.completed.push(step);
                Ok(value)
            }
            Err(source) => {
                tracing::warn!(
                    step = %step,
                    completed = %join_steps(&self.completed),
                    error = %source,
                    "cascade step failed"
                );
                Err(ShipmentError::Cascade {
                    completed: self.completed.clone(),
                    failed: step,
                    source,
                })
            }
        }
    }

    pub(crate) fn completed(&self) -> &[CascadeStep] {
        &self.completed
    }
}
