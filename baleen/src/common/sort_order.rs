/// Direction in which a comparator orders versions.
///
/// A [Comparator](crate::comparator::Comparator) keeps the order of its
/// provider when `Ascending` and inverts it when `Descending`. Reversing a
/// comparator flips this value, so reversing twice yields the original order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest to newest
    Ascending,
    /// Newest to oldest
    Descending,
}

impl SortOrder {
    pub fn reverse(self) -> SortOrder {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}
