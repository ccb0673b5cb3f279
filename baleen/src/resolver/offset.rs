use crate::collection::Collection;
use crate::resolver::Resolver;
use crate::version::Version;
use regex::Regex;
use std::sync::LazyLock;

// None only if the pattern fails to compile; every alias is then treated as
// not being an offset
static OFFSET_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(?P<base>.+?)(?P<ops>[+\-~^]+)(?P<count>\d+)?$").ok());

/// Resolves relative references such as `HEAD-1`, `v3+`, `v3++` or `v3+2`.
///
/// # Syntax
/// `BASE` followed by a run of operators and an optional count:
/// - `+` moves forward, `-`, `~` and `^` move backward
/// - without a count, the number of operator characters is the count
///   (`v3++` is `v3+2`)
/// - a run mixing forward and backward operators is not an offset
///
/// # Behavior
/// `BASE` is resolved through the collection's own resolver chain, so any
/// other alias can serve as base. The result is the version at
/// `position(BASE) ± count`, or unresolved when that falls outside the
/// collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetResolver;

impl OffsetResolver {
    pub fn new() -> Self {
        OffsetResolver
    }

    /// Splits an alias into its base and signed offset.
    pub fn parse(alias: &str) -> Option<(&str, i64)> {
        let captures = OFFSET_PATTERN.as_ref()?.captures(alias)?;
        let base = captures.name("base")?.as_str();
        let ops = captures.name("ops")?.as_str();

        let forward = ops.chars().all(|c| c == '+');
        let backward = ops.chars().all(|c| c != '+');
        if !forward && !backward {
            return None;
        }

        let count = match captures.name("count") {
            Some(count) => count.as_str().parse::<i64>().ok()?,
            None => ops.chars().count() as i64,
        };
        Some((base, if forward { count } else { -count }))
    }
}

impl Resolver for OffsetResolver {
    fn name(&self) -> String {
        "OffsetResolver".to_string()
    }

    fn resolve(&self, alias: &str, collection: &Collection) -> Option<Version> {
        let (base, offset) = Self::parse(alias)?;
        let base = collection.find(base)?;
        let position = collection.position(base.id().as_str())? as i64;

        let target = position.checked_add(offset)?;
        if target < 1 {
            return None;
        }
        collection.get_by_position(target as usize).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::sorted_collection;

    fn collection() -> Collection {
        sorted_collection(&[
            ("v1", true),
            ("v2", true),
            ("v3", true),
            ("v4", false),
            ("v5", false),
        ])
    }

    fn resolve(alias: &str) -> Option<String> {
        OffsetResolver
            .resolve(alias, &collection())
            .map(|v| v.id().to_string())
    }

    #[test]
    fn test_parse() {
        assert_eq!(OffsetResolver::parse("v3+"), Some(("v3", 1)));
        assert_eq!(OffsetResolver::parse("v3++"), Some(("v3", 2)));
        assert_eq!(OffsetResolver::parse("v3+2"), Some(("v3", 2)));
        assert_eq!(OffsetResolver::parse("v3-3"), Some(("v3", -3)));
        assert_eq!(OffsetResolver::parse("HEAD~"), Some(("HEAD", -1)));
        assert_eq!(OffsetResolver::parse("HEAD^^"), Some(("HEAD", -2)));
        assert_eq!(OffsetResolver::parse("HEAD-~"), Some(("HEAD", -2)));
        assert_eq!(OffsetResolver::parse("v3+-"), None);
        assert_eq!(OffsetResolver::parse("v3"), None);
        assert_eq!(OffsetResolver::parse("+1"), None);
    }

    #[test]
    fn test_forward_offsets() {
        assert_eq!(resolve("v2+"), Some("v3".to_string()));
        assert_eq!(resolve("v2++"), Some("v4".to_string()));
        assert_eq!(resolve("v2+++"), resolve("v2+3"));
        assert_eq!(resolve("v5+"), None);
    }

    #[test]
    fn test_backward_offsets() {
        assert_eq!(resolve("v4-2"), Some("v2".to_string()));
        assert_eq!(resolve("v4~"), Some("v3".to_string()));
        assert_eq!(resolve("v2-2"), None);
        assert_eq!(resolve("v1-"), None);
    }

    #[test]
    fn test_zero_offset_is_base() {
        assert_eq!(resolve("v3+0"), Some("v3".to_string()));
    }

    #[test]
    fn test_base_resolved_through_chain() {
        assert_eq!(resolve("HEAD-1"), Some("v2".to_string()));
        assert_eq!(resolve("HEAD+"), Some("v4".to_string()));
        assert_eq!(resolve("latest-4"), Some("v1".to_string()));
        assert_eq!(resolve("first+1"), Some("v2".to_string()));
    }

    #[test]
    fn test_unknown_base() {
        assert_eq!(resolve("nope+1"), None);
    }

    #[test]
    fn test_huge_count_does_not_overflow() {
        assert_eq!(resolve("v1+99999999999999999999"), None);
        assert_eq!(resolve("v1+9223372036854775807"), None);
    }
}
