//! Domain events emitted by fulfillment lifecycles.

pub mod event;

pub use event::Event;
