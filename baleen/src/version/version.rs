use crate::common::sha256_hex;
use crate::errors::{BaleenError, BaleenResult, ErrorKind};
use crate::version::Migration;
use std::borrow::Borrow;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Stable identifier of a version.
///
/// # Characteristics
/// - Never empty, enforced at construction
/// - Immutable once created
/// - Compared as a plain string
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VersionId(String);

impl VersionId {
    /// Creates an id from an explicit token.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the token is empty or only whitespace.
    pub fn new(id: impl Into<String>) -> BaleenResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            log::error!("Version id cannot be empty");
            return Err(BaleenError::new(
                "Version id cannot be empty",
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(VersionId(id))
    }

    /// Derives an id from a migration name.
    ///
    /// The id is the hex SHA-256 of the name, so it is deterministic and never
    /// empty.
    pub fn from_name(name: &str) -> Self {
        VersionId(sha256_hex(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for VersionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Debug for VersionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "VersionId({})", self.0)
    }
}

impl AsRef<str> for VersionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for VersionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for VersionId {
    type Error = BaleenError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        VersionId::new(value)
    }
}

/// Identity and applied state of one migration.
///
/// # Purpose
/// A `Version` binds a [VersionId] to the [Migration] it executes and records
/// whether that migration is currently applied.
///
/// # Characteristics
/// - **Shared handle**: clones share the same state, so the copy held by a
///   changed-set reports the same applied flag as the copy in the collection
/// - **Identity equality**: two versions are equal iff their ids are equal,
///   regardless of applied state
/// - **Runner-owned state**: the applied flag is flipped by the runner after a
///   successful run; callers set the initial state at construction
#[derive(Clone)]
pub struct Version {
    inner: Arc<VersionInner>,
}

impl Version {
    /// Creates a not-applied version with an explicit id.
    pub fn new(id: VersionId, migration: Arc<dyn Migration>) -> Self {
        Version {
            inner: Arc::new(VersionInner {
                id,
                applied: AtomicBool::new(false),
                revision: AtomicU64::new(0),
                migration,
            }),
        }
    }

    /// Creates a not-applied version whose id is derived from the migration's
    /// name.
    pub fn from_migration(migration: Arc<dyn Migration>) -> Self {
        let id = VersionId::from_name(&migration.name());
        Version::new(id, migration)
    }

    /// Sets the initial applied state.
    pub fn with_applied(self, applied: bool) -> Self {
        self.set_applied(applied);
        self
    }

    pub fn id(&self) -> &VersionId {
        &self.inner.id
    }

    /// Name of the underlying migration.
    pub fn name(&self) -> String {
        self.inner.migration.name()
    }

    pub fn is_applied(&self) -> bool {
        self.inner.applied.load(Ordering::SeqCst)
    }

    pub(crate) fn set_applied(&self, applied: bool) {
        if self.inner.applied.swap(applied, Ordering::SeqCst) != applied {
            self.inner.revision.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Number of applied-state changes seen by this version and its clones.
    pub(crate) fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::SeqCst)
    }

    pub fn migration(&self) -> &Arc<dyn Migration> {
        &self.inner.migration
    }

    pub fn source_file(&self) -> Option<String> {
        self.inner.migration.source_file()
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner.id)
    }
}

impl Debug for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Version")
            .field("id", &self.inner.id.as_str())
            .field("name", &self.name())
            .field("applied", &self.is_applied())
            .finish()
    }
}

struct VersionInner {
    id: VersionId,
    applied: AtomicBool,
    revision: AtomicU64,
    migration: Arc<dyn Migration>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::TestMigration;

    #[test]
    fn test_version_id_rejects_empty() {
        let result = VersionId::new("");
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::InvalidArgument);

        assert!(VersionId::new("   ").is_err());
        assert!(VersionId::try_from("v1").is_ok());
    }

    #[test]
    fn test_version_id_from_name_is_stable() {
        let a = VersionId::from_name("app::V1");
        let b = VersionId::from_name("app::V1");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_from_migration_derives_id() {
        let migration = TestMigration::new("app::V1");
        let version = Version::from_migration(migration);
        assert_eq!(version.id(), &VersionId::from_name("app::V1"));
        assert_eq!(version.name(), "app::V1");
        assert!(!version.is_applied());
    }

    #[test]
    fn test_equality_ignores_applied_state() {
        let migration = TestMigration::new("app::V1");
        let id = VersionId::new("v1").unwrap();
        let a = Version::new(id.clone(), migration.clone()).with_applied(true);
        let b = Version::new(id, migration);
        assert_eq!(a, b);
        assert_ne!(a.is_applied(), b.is_applied());
    }

    #[test]
    fn test_clones_share_applied_state() {
        let version = Version::from_migration(TestMigration::new("app::V1"));
        let copy = version.clone();
        version.set_applied(true);
        assert!(copy.is_applied());
    }

    #[test]
    fn test_revision_counts_state_changes() {
        let version = Version::from_migration(TestMigration::new("app::V1"));
        let copy = version.clone();
        version.set_applied(false);
        assert_eq!(copy.revision(), 0);

        version.set_applied(true);
        copy.set_applied(true);
        assert_eq!(version.revision(), 1);

        copy.set_applied(false);
        assert_eq!(version.revision(), 2);
    }

    #[test]
    fn test_debug_contains_id_and_state() {
        let version = Version::new(VersionId::new("v1").unwrap(), TestMigration::new("app::V1"));
        let debug = format!("{:?}", version);
        assert!(debug.contains("v1"));
        assert!(debug.contains("applied: false"));
        assert_eq!(version.to_string(), "v1");
    }
}
