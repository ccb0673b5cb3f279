use crate::collection::Collection;
use crate::resolver::Resolver;
use crate::version::Version;

/// Resolves exact ids and unambiguous id prefixes.
///
/// An exact match always wins. Otherwise the alias is treated as a prefix:
/// exactly one id starting with it resolves to that version, two or more make
/// the alias ambiguous and leave it unresolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct LazyIdResolver;

impl Resolver for LazyIdResolver {
    fn name(&self) -> String {
        "LazyIdResolver".to_string()
    }

    fn resolve(&self, alias: &str, collection: &Collection) -> Option<Version> {
        if alias.is_empty() {
            return None;
        }
        if let Some(version) = collection.get(alias) {
            return Some(version.clone());
        }

        let mut candidates = collection
            .iter()
            .filter(|v| v.id().as_str().starts_with(alias));
        match (candidates.next(), candidates.next()) {
            (Some(version), None) => Some(version.clone()),
            (Some(_), Some(_)) => {
                log::debug!("Id prefix '{}' is ambiguous", alias);
                None
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::sorted_collection;

    #[test]
    fn test_prefix_resolution() {
        let collection = sorted_collection(&[("abcd1234", false), ("abcd9876", false)]);
        let resolve = |alias: &str| LazyIdResolver.resolve(alias, &collection).map(|v| v.id().to_string());

        assert_eq!(resolve("abcd1"), Some("abcd1234".to_string()));
        assert_eq!(resolve("abcd9"), Some("abcd9876".to_string()));
        assert_eq!(resolve("abcd"), None);
        assert_eq!(resolve("zz"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn test_exact_match_wins_over_longer_ids() {
        let collection = sorted_collection(&[("abc", false), ("abcdef", false)]);
        assert_eq!(
            LazyIdResolver.resolve("abc", &collection).map(|v| v.id().to_string()),
            Some("abc".to_string())
        );
    }
}
