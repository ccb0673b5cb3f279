use crate::collection::Collection;
use crate::errors::BaleenResult;
use crate::repository::Repository;
use crate::version::{Migration, Version};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Repository over a fixed list of migrations registered in code.
///
/// Every fetch creates fresh, not-applied versions whose ids are derived from
/// the migration names.
///
/// # Usage
/// ```ignore
/// let mut repository = InMemoryRepository::new();
/// repository.add(Arc::new(CreateUsers));
/// repository.add(Arc::new(AddEmailIndex));
/// let collection = repository.fetch_all()?;
/// ```
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    migrations: Vec<Arc<dyn Migration>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        InMemoryRepository {
            migrations: Vec::new(),
        }
    }

    pub fn with_migrations(migrations: Vec<Arc<dyn Migration>>) -> Self {
        InMemoryRepository { migrations }
    }

    pub fn add(&mut self, migration: Arc<dyn Migration>) {
        self.migrations.push(migration);
    }

    pub fn len(&self) -> usize {
        self.migrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }
}

impl Repository for InMemoryRepository {
    /// # Errors
    /// Returns `AlreadyExists` if two migrations share a name.
    fn fetch_all(&self) -> BaleenResult<Collection> {
        let versions = self
            .migrations
            .iter()
            .map(|migration| Version::from_migration(migration.clone()));
        Collection::with_versions(versions)
    }
}

impl Debug for InMemoryRepository {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field(
                "migrations",
                &self.migrations.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
