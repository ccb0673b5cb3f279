use crate::collection::Collection;
use crate::resolver::Resolver;
use crate::version::Version;

/// Resolves `HEAD` (any case) to the most recent applied version.
///
/// HEAD is only defined when the applied versions form one contiguous run in
/// the current order; it is then the last version of that run. No applied
/// version, or applied versions separated by a not-applied one, leave HEAD
/// unresolved rather than guessing which one was meant.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadResolver;

impl Resolver for HeadResolver {
    fn name(&self) -> String {
        "HeadResolver".to_string()
    }

    fn resolve(&self, alias: &str, collection: &Collection) -> Option<Version> {
        if !alias.eq_ignore_ascii_case("head") {
            return None;
        }

        let mut head: Option<&Version> = None;
        let mut run_closed = false;
        for version in collection.iter() {
            match (version.is_applied(), head.is_some()) {
                (true, _) if run_closed => {
                    log::debug!("HEAD is ambiguous: applied versions are not contiguous");
                    return None;
                }
                (true, _) => head = Some(version),
                (false, true) => run_closed = true,
                (false, false) => {}
            }
        }
        head.cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::sorted_collection;

    fn head(layout: &[(&str, bool)], alias: &str) -> Option<String> {
        HeadResolver
            .resolve(alias, &sorted_collection(layout))
            .map(|v| v.id().to_string())
    }

    #[test]
    fn test_head_is_last_applied() {
        let layout = [("v1", true), ("v2", true), ("v3", false)];
        assert_eq!(head(&layout, "HEAD"), Some("v2".to_string()));
        assert_eq!(head(&layout, "head"), Some("v2".to_string()));
        assert_eq!(head(&layout, "Head"), Some("v2".to_string()));
    }

    #[test]
    fn test_head_with_leading_unapplied() {
        let layout = [("v1", false), ("v2", true), ("v3", true)];
        assert_eq!(head(&layout, "HEAD"), Some("v3".to_string()));
    }

    #[test]
    fn test_nothing_applied_is_unresolved() {
        assert_eq!(head(&[("v1", false), ("v2", false)], "HEAD"), None);
        assert_eq!(head(&[], "HEAD"), None);
    }

    #[test]
    fn test_gap_between_applied_is_unresolved() {
        assert_eq!(head(&[("v1", true), ("v2", false), ("v3", true)], "HEAD"), None);
    }

    #[test]
    fn test_other_aliases_ignored() {
        assert_eq!(head(&[("v1", true)], "HEADS"), None);
        assert_eq!(head(&[("v1", true)], "v1"), None);
    }
}
