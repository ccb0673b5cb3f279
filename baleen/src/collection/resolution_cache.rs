use crate::version::Version;
use dashmap::DashMap;

/// Memoized alias resolutions of a single collection.
///
/// Unresolved aliases are stored as `None` so repeated misses are cheap as
/// well. The owning collection clears the cache on every structural change.
/// Each entry carries the applied-state stamp it was resolved under; a lookup
/// with a different stamp is a miss.
pub(crate) struct ResolutionCache {
    entries: DashMap<String, (u64, Option<Version>)>,
}

impl ResolutionCache {
    pub(crate) fn new() -> Self {
        ResolutionCache {
            entries: DashMap::new(),
        }
    }

    /// Returns the cached resolution, `None` on a cache miss or when the entry
    /// was stored under another stamp.
    #[inline]
    pub(crate) fn get(&self, alias: &str, stamp: u64) -> Option<Option<Version>> {
        self.entries
            .get(alias)
            .filter(|entry| entry.value().0 == stamp)
            .map(|entry| entry.value().1.clone())
    }

    #[inline]
    pub(crate) fn put(&self, alias: &str, stamp: u64, resolution: Option<Version>) {
        self.entries.insert(alias.to_string(), (stamp, resolution));
    }

    #[inline]
    pub(crate) fn clear(&self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::version;

    #[test]
    fn test_miss_then_hit() {
        let cache = ResolutionCache::new();
        assert!(cache.get("HEAD", 0).is_none());

        cache.put("HEAD", 0, Some(version("v1", true)));
        cache.put("nope", 0, None);
        assert_eq!(cache.get("HEAD", 0), Some(Some(version("v1", true))));
        assert_eq!(cache.get("nope", 0), Some(None));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_other_stamp_is_a_miss() {
        let cache = ResolutionCache::new();
        cache.put("HEAD", 3, Some(version("v1", true)));
        assert!(cache.get("HEAD", 4).is_none());

        cache.put("HEAD", 4, Some(version("v2", true)));
        assert_eq!(cache.get("HEAD", 4), Some(Some(version("v2", true))));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let cache = ResolutionCache::new();
        cache.put("HEAD", 0, None);
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("HEAD", 0).is_none());
    }
}
