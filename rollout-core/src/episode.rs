//! Episodes, the unit of data produced by samplers.
//!
//! An [`Episode`] is a set of time-aligned fields keyed by [`FieldKey`].
//! Samplers hand episodes over to a [`Trajectory`](crate::Trajectory) by value.
mod base;
mod field;
pub use base::Episode;
pub(crate) use base::check_field;
pub use field::FieldKey;
