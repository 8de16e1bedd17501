//! Marker trait for domain objects with a stable identity.

/// A domain object identified by a typed id rather than by its fields.
///
/// Products, orders, users and coupons all expose their id through this so
/// store code can key them uniformly.
pub trait Entity {
    /// The entity's identifier newtype.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
