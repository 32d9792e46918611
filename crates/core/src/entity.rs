//! Entity trait: identity + continuity across state changes.

/// Shipments, inventory units and shipping charges are entities: two records
/// with the same identifier are the same record, whatever their fields say.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Same record, possibly at a different point in its life.
    fn is_same(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
