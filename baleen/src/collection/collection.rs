use crate::collection::ResolutionCache;
use crate::comparator::Comparator;
use crate::errors::{BaleenError, BaleenResult, ErrorKind};
use crate::resolver::ResolverChain;
use crate::version::{Version, VersionId};
use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt::{Debug, Formatter};

/// Ordered, unique-by-id set of versions.
///
/// # Purpose
/// The collection is the coordinate space of the engine: it holds every known
/// version, defines their order through a [Comparator], and answers positional
/// and symbolic lookups ("HEAD", "v3+2", an id prefix, ...) through a
/// [ResolverChain].
///
/// # Characteristics
/// - **Unique ids**: adding a duplicate id fails with `AlreadyExists`
/// - **Explicit order**: iteration order is whatever the last `sort()`
///   produced; structural mutations clear the sorted flag
/// - **1-based positions**: `position()` and `get_by_position()` follow the
///   current order, so re-sorting invalidates positions obtained earlier
/// - **Coherent resolution cache**: alias resolutions are memoized per
///   collection, dropped on every structural change or sort, and ignored once
///   the applied state of any member has changed since they were stored
///
/// # Example
/// ```rust,ignore
/// let mut collection = Collection::with_versions(versions)?;
/// collection.sort();
/// let head = collection.find("HEAD");
/// let previous = collection.find("HEAD-1");
/// ```
pub struct Collection {
    versions: IndexMap<VersionId, Version>,
    sorted: bool,
    comparator: Comparator,
    resolver: ResolverChain,
    cache: ResolutionCache,
}

impl Collection {
    /// Creates an empty collection with the default comparator and resolvers.
    pub fn new() -> Self {
        Collection {
            versions: IndexMap::new(),
            sorted: true,
            comparator: Comparator::default(),
            resolver: ResolverChain::default(),
            cache: ResolutionCache::new(),
        }
    }

    /// Creates an unsorted collection from a list of versions.
    ///
    /// # Errors
    /// Returns `AlreadyExists` if two versions share an id.
    pub fn with_versions(versions: impl IntoIterator<Item = Version>) -> BaleenResult<Self> {
        let mut collection = Collection::new();
        for version in versions {
            collection.add(version)?;
        }
        Ok(collection)
    }

    /// Replaces the resolver chain used by `find`.
    pub fn set_resolver(&mut self, resolver: ResolverChain) {
        self.resolver = resolver;
        self.invalidate();
    }

    pub fn resolver(&self) -> &ResolverChain {
        &self.resolver
    }

    /// Replaces the comparator. The collection must be sorted again before it
    /// can be run.
    pub fn set_comparator(&mut self, comparator: Comparator) {
        self.comparator = comparator;
        self.sorted = false;
        self.invalidate();
    }

    pub fn comparator(&self) -> &Comparator {
        &self.comparator
    }

    /// Adds a version.
    ///
    /// # Errors
    /// Returns `AlreadyExists` if a version with the same id is present; the
    /// collection is left unchanged.
    pub fn add(&mut self, version: Version) -> BaleenResult<()> {
        if self.versions.contains_key(version.id()) {
            log::error!("Version {} already exists in the collection", version.id());
            return Err(BaleenError::new(
                &format!("Version {} already exists in the collection", version.id()),
                ErrorKind::AlreadyExists,
            ));
        }
        self.versions.insert(version.id().clone(), version);
        self.mark_unsorted();
        Ok(())
    }

    /// Removes a version by id, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<Version> {
        let removed = self.versions.shift_remove(id)?;
        self.mark_unsorted();
        Some(removed)
    }

    /// Inserts or overwrites a version, returning the previous holder of the
    /// id. An overwritten version keeps its position.
    pub fn replace(&mut self, version: Version) -> Option<Version> {
        let previous = self.versions.insert(version.id().clone(), version);
        self.mark_unsorted();
        previous
    }

    /// Replaces or adds every version of `other` into this collection. The
    /// incoming version always wins.
    pub fn merge(&mut self, other: &Collection) {
        for version in other.iter() {
            self.versions.insert(version.id().clone(), version.clone());
        }
        self.mark_unsorted();
    }

    /// Sorts with the collection's comparator.
    pub fn sort(&mut self) {
        let comparator = self.comparator.clone();
        self.versions.sort_by(|_, a, _, b| comparator.compare(a, b));
        self.sorted = true;
        self.invalidate();
    }

    /// Sets the comparator and sorts with it.
    pub fn sort_with(&mut self, comparator: Comparator) {
        self.comparator = comparator;
        self.sort();
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Fails with `CollectionNotSorted` unless the collection is sorted.
    pub fn ensure_sorted(&self) -> BaleenResult<()> {
        if self.sorted {
            Ok(())
        } else {
            Err(BaleenError::new(
                "Collection was modified after sorting and must be sorted again before running",
                ErrorKind::CollectionNotSorted,
            ))
        }
    }

    pub fn get(&self, id: &str) -> Option<&Version> {
        self.versions.get(id)
    }

    pub fn has(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// 1-based position of the version with the given id in the current order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.versions.get_index_of(id).map(|index| index + 1)
    }

    /// Version at the given 1-based position in the current order.
    pub fn get_by_position(&self, position: usize) -> Option<&Version> {
        if position == 0 {
            return None;
        }
        self.versions.get_index(position - 1).map(|(_, v)| v)
    }

    pub fn first(&self) -> Option<&Version> {
        self.versions.first().map(|(_, v)| v)
    }

    pub fn last(&self) -> Option<&Version> {
        self.versions.last().map(|(_, v)| v)
    }

    /// Resolves an alias through the resolver chain, falling back to a direct
    /// id lookup.
    pub fn find(&self, alias: &str) -> Option<Version> {
        self.find_with(alias, true)
    }

    /// Looks up an alias, consulting the resolver chain only if `resolve` is
    /// set. Resolutions, including unresolved ones, are cached until the next
    /// structural change or applied-state change.
    pub fn find_with(&self, alias: &str, resolve: bool) -> Option<Version> {
        if resolve {
            let stamp = self.state_stamp();
            let resolved = match self.cache.get(alias, stamp) {
                Some(hit) => hit,
                None => {
                    // resolvers may call back into find, no cache entry is held here
                    let result = self.resolver.resolve(alias, self);
                    self.cache.put(alias, stamp, result.clone());
                    result
                }
            };
            if resolved.is_some() {
                return resolved;
            }
        }
        self.get(alias).cloned()
    }

    /// Like `find`, but reports an unresolved alias as `NotFound`.
    pub fn find_or_fail(&self, alias: &str) -> BaleenResult<Version> {
        self.find(alias).ok_or_else(|| {
            BaleenError::new(
                &format!("Could not resolve '{}' to a version", alias),
                ErrorKind::NotFound,
            )
        })
    }

    /// Drops every cached alias resolution of this collection.
    pub fn clear_resolution_cache(&self) {
        self.invalidate();
    }

    /// Sub-collection of the versions matching `predicate`, in the current
    /// order. The result shares version handles with this collection and
    /// inherits its comparator, resolvers and sorted flag.
    pub fn filter(&self, predicate: impl Fn(&Version) -> bool) -> Collection {
        let versions = self
            .versions
            .iter()
            .filter(|(_, v)| predicate(v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.derive(versions)
    }

    /// Sub-collection between two 1-based positions, both inclusive.
    pub fn slice(&self, from: usize, to: usize) -> Collection {
        let versions = self
            .versions
            .iter()
            .enumerate()
            .filter(|(index, _)| index + 1 >= from && index + 1 <= to)
            .map(|(_, (k, v))| (k.clone(), v.clone()))
            .collect();
        self.derive(versions)
    }

    /// Sub-collection of the applied versions.
    pub fn applied(&self) -> Collection {
        self.filter(|v| v.is_applied())
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Version> + ExactSizeIterator {
        self.versions.values()
    }

    pub fn ids(&self) -> Vec<VersionId> {
        self.versions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Appends a version the caller knows to keep the current order intact.
    /// Used by the runner to build changed-sets in execution order.
    pub(crate) fn push_ordered(&mut self, version: Version) {
        self.versions.insert(version.id().clone(), version);
        self.invalidate();
    }

    fn derive(&self, versions: IndexMap<VersionId, Version>) -> Collection {
        Collection {
            versions,
            sorted: self.sorted,
            comparator: self.comparator.clone(),
            resolver: self.resolver.clone(),
            cache: ResolutionCache::new(),
        }
    }

    // revisions only grow, so the sum moves whenever any shared version flips,
    // including flips made through another collection holding the same handles
    fn state_stamp(&self) -> u64 {
        self.versions
            .values()
            .fold(0u64, |stamp, version| stamp.wrapping_add(version.revision()))
    }

    fn mark_unsorted(&mut self) {
        self.sorted = false;
        self.invalidate();
    }

    fn invalidate(&self) {
        if !self.cache.is_empty() {
            log::trace!("Invalidating {} cached alias resolution(s)", self.cache.len());
            self.cache.clear();
        }
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Collection {
    fn clone(&self) -> Self {
        self.derive(self.versions.clone())
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Version;
    type IntoIter = indexmap::map::Values<'a, VersionId, Version>;

    fn into_iter(self) -> Self::IntoIter {
        self.versions.values()
    }
}

impl Debug for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("versions", &self.versions.keys().map(|k| k.as_str()).join(", "))
            .field("sorted", &self.sorted)
            .field("comparator", &self.comparator)
            .finish()
    }
}
