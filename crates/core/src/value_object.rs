//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. Two
/// billing addresses with the same fields are the same address; two orders with
/// the same fields but different codes are not the same order (those are
/// entities, see [`crate::Entity`]).
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Slug(String);
///
/// impl ValueObject for Slug {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
