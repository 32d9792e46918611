use chrono::{DateTime, Utc};

/// A fact about something that already happened to a fulfillment record.
///
/// Never mutated after creation; `version` lets stored history evolve.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable dotted name, e.g. `"shipping.shipment.shipped"`.
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// Identifier of the record the event happened to.
    fn subject(&self) -> String;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
