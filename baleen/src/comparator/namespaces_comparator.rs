use crate::comparator::{Comparator, ComparatorProvider};
use crate::errors::{BaleenError, BaleenResult, ErrorKind};
use crate::version::Version;
use std::cmp::Ordering;

/// Orders versions by namespace priority, delegating ties to a fallback.
///
/// # Purpose
/// Lets migrations from several sources (for example an application and the
/// libraries it embeds) be ordered by source first. Namespaces are given
/// highest priority first and matched as prefixes of the migration name.
///
/// # Behavior
/// - The same version compares equal without consulting namespaces.
/// - A version in a higher-priority namespace is greater than one in a lower
///   priority namespace or in no namespace.
/// - Two versions in the same namespace, or both in none, are ordered entirely
///   by the fallback comparator.
///
/// # Example
/// ```rust
/// use baleen::comparator::{Comparator, NamespacesAwareComparator};
///
/// let comparator = NamespacesAwareComparator::new(
///     vec!["app::".to_string(), "vendor::".to_string()],
///     Comparator::default(),
/// ).unwrap();
/// let comparator = Comparator::new(comparator);
/// ```
pub struct NamespacesAwareComparator {
    namespaces: Vec<String>,
    fallback: Comparator,
}

impl NamespacesAwareComparator {
    /// Creates the comparator.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if any namespace is empty, since an empty
    /// prefix would match every migration.
    pub fn new(namespaces: Vec<String>, fallback: Comparator) -> BaleenResult<Self> {
        if namespaces.iter().any(|ns| ns.is_empty()) {
            return Err(BaleenError::new(
                "Namespace prefixes cannot be empty",
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(NamespacesAwareComparator {
            namespaces,
            fallback,
        })
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    // Index of the first (highest priority) namespace the name belongs to.
    fn group_of(&self, name: &str) -> Option<usize> {
        self.namespaces.iter().position(|ns| name.starts_with(ns.as_str()))
    }
}

impl ComparatorProvider for NamespacesAwareComparator {
    fn name(&self) -> String {
        "NamespacesAwareComparator".to_string()
    }

    fn compare(&self, a: &Version, b: &Version) -> Ordering {
        if a.id() == b.id() {
            return Ordering::Equal;
        }

        match (self.group_of(&a.name()), self.group_of(&b.name())) {
            (Some(ga), Some(gb)) if ga != gb => gb.cmp(&ga),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            _ => self.fallback.compare(a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::version;

    fn comparator() -> NamespacesAwareComparator {
        NamespacesAwareComparator::new(
            vec!["app::".to_string(), "lib::".to_string()],
            Comparator::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_empty_namespace() {
        let result = NamespacesAwareComparator::new(vec!["".to_string()], Comparator::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_higher_priority_group_is_greater() {
        let cmp = comparator();
        let app = version("app::V1", false);
        let lib = version("lib::V9", false);
        assert_eq!(cmp.compare(&app, &lib), Ordering::Greater);
        assert_eq!(cmp.compare(&lib, &app), Ordering::Less);
    }

    #[test]
    fn test_grouped_beats_ungrouped() {
        let cmp = comparator();
        let lib = version("lib::V1", false);
        let other = version("zzz::V1", false);
        assert_eq!(cmp.compare(&lib, &other), Ordering::Greater);
        assert_eq!(cmp.compare(&other, &lib), Ordering::Less);
    }

    #[test]
    fn test_same_group_delegates_to_fallback() {
        let cmp = comparator();
        assert_eq!(
            cmp.compare(&version("app::V1", false), &version("app::V2", false)),
            Ordering::Less
        );
        assert_eq!(
            cmp.compare(&version("x::V2", false), &version("y::V1", false)),
            Ordering::Less
        );
    }

    #[test]
    fn test_same_version_is_equal() {
        let cmp = comparator();
        assert_eq!(
            cmp.compare(&version("app::V1", false), &version("app::V1", true)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_reversed_fallback_is_honoured() {
        let cmp = NamespacesAwareComparator::new(
            vec!["app::".to_string()],
            Comparator::default().reverse(),
        )
        .unwrap();
        assert_eq!(
            cmp.compare(&version("app::V1", false), &version("app::V2", false)),
            Ordering::Greater
        );
    }
}
