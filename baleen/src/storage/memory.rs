use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use crate::errors::BaleenResult;
use crate::storage::Storage;
use crate::version::{Version, VersionId};
use indexmap::IndexSet;
use std::fmt::{Debug, Formatter};

/// Storage keeping the applied ids in process memory.
///
/// # Characteristics
/// - **Shared**: clones see the same set of applied ids
/// - **Ordered**: ids are returned in the order they were recorded
/// - **No Persistence**: everything is lost when the last clone is dropped
#[derive(Clone, Default)]
pub struct MemoryStorage {
    applied: Atomic<IndexSet<VersionId>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage {
            applied: atomic(IndexSet::new()),
        }
    }

    /// Creates a storage that already records `ids` as applied.
    pub fn with_applied(ids: impl IntoIterator<Item = VersionId>) -> Self {
        MemoryStorage {
            applied: atomic(ids.into_iter().collect()),
        }
    }

    pub fn is_applied(&self, id: &str) -> bool {
        self.applied.read_with(|applied| applied.contains(id))
    }
}

impl Storage for MemoryStorage {
    fn fetch_applied(&self) -> BaleenResult<Vec<VersionId>> {
        Ok(self.applied.read_with(|applied| applied.iter().cloned().collect()))
    }

    fn update(&self, version: &Version) -> BaleenResult<()> {
        self.applied.write_with(|applied| {
            if version.is_applied() {
                applied.insert(version.id().clone());
            } else {
                applied.shift_remove(version.id());
            }
        });
        Ok(())
    }
}

impl Debug for MemoryStorage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("applied", &self.applied.read_with(|a| a.len()))
            .finish()
    }
}
