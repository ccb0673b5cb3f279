use crate::common::SortOrder;
use crate::comparator::NameComparator;
use crate::version::Version;
use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Contract for ordering strategies over versions.
///
/// # Purpose
/// A provider defines the ascending order of two versions. It must be a total
/// order: when its primary attribute ties for two different versions it must
/// break the tie (for example by falling back to another comparator) instead
/// of reporting them as equal.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so comparators can be shared through
/// configuration.
pub trait ComparatorProvider: Send + Sync {
    /// Returns the name of this ordering strategy.
    fn name(&self) -> String;

    /// Compares two versions in ascending order.
    fn compare(&self, a: &Version, b: &Version) -> Ordering;
}

/// Cloneable, direction-aware comparator.
///
/// # Characteristics
/// - **Type-erased**: works with any `ComparatorProvider`
/// - **Cheap to clone**: the provider is shared via `Arc`
/// - **Involutive reverse**: `reverse()` flips the sort order, so
///   `c.reverse().reverse()` orders exactly like `c`
///
/// # Example
/// ```rust
/// use baleen::comparator::{Comparator, NameComparator};
///
/// let ascending = Comparator::new(NameComparator);
/// let descending = ascending.reverse();
/// assert_eq!(descending.reverse().order(), ascending.order());
/// ```
#[derive(Clone)]
pub struct Comparator {
    inner: Arc<dyn ComparatorProvider>,
    order: SortOrder,
}

impl Comparator {
    /// Creates an ascending comparator from a provider.
    pub fn new<T: ComparatorProvider + 'static>(inner: T) -> Self {
        Comparator {
            inner: Arc::new(inner),
            order: SortOrder::Ascending,
        }
    }

    pub fn name(&self) -> String {
        self.inner.name()
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Compares two versions, honouring the sort order of this comparator.
    pub fn compare(&self, a: &Version, b: &Version) -> Ordering {
        let ordering = self.inner.compare(a, b);
        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }

    /// Returns a comparator with the inverse order sharing the same provider.
    pub fn reverse(&self) -> Comparator {
        Comparator {
            inner: self.inner.clone(),
            order: self.order.reverse(),
        }
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Comparator::new(NameComparator)
    }
}

impl Debug for Comparator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Comparator")
            .field("name", &self.name())
            .field("order", &self.order)
            .finish()
    }
}
