//! Ordering of versions.
//!
//! Every comparator is a [Comparator] handle wrapping a [ComparatorProvider].
//! The handle owns the direction, so `reverse()` never stacks wrappers.

mod comparator;
mod name_comparator;
mod namespaces_comparator;

pub use comparator::*;
pub use name_comparator::*;
pub use namespaces_comparator::*;
