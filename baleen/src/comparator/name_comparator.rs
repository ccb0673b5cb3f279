use crate::comparator::ComparatorProvider;
use crate::version::Version;
use std::cmp::Ordering;

/// Orders versions by their migration name, ascending.
///
/// Two different versions whose migrations report the same name are ordered
/// by id, so the order stays total.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameComparator;

impl ComparatorProvider for NameComparator {
    fn name(&self) -> String {
        "NameComparator".to_string()
    }

    fn compare(&self, a: &Version, b: &Version) -> Ordering {
        if a.id() == b.id() {
            return Ordering::Equal;
        }
        a.name().cmp(&b.name()).then_with(|| a.id().cmp(b.id()))
    }
}
