use crate::collection::Collection;
use crate::errors::BaleenResult;

/// Source of every version an application knows about.
///
/// # Purpose
/// A repository discovers migrations (from a registry, a directory scan, a
/// plugin list, ...) and binds each of them to a version. How discovery works
/// is entirely up to the implementation.
///
/// # Contract
/// - Every returned version must already be bound to its migration
/// - The collection may be unsorted; the engine sorts it with its own
///   comparator before use
/// - Applied flags are hydrated by the engine from
///   [Storage](crate::storage::Storage), the repository does not need to
///   set them
pub trait Repository: Send + Sync {
    /// Returns every known version.
    fn fetch_all(&self) -> BaleenResult<Collection>;
}
