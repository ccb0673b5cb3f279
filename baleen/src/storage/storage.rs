use crate::collection::Collection;
use crate::errors::BaleenResult;
use crate::version::{Version, VersionId};

/// Persistence of which versions are applied.
///
/// # Purpose
/// The engine never reads storage while a run is in progress. It fetches the
/// applied ids once to hydrate a freshly discovered collection, and hands the
/// versions it changed back after the run.
///
/// # Contract
/// - `fetch_applied` returns the ids recorded as applied, in any order;
///   ids unknown to the repository are ignored by the engine
/// - `update` records the current applied flag of one version: an applied
///   version is added, a not-applied one removed
/// - `update_all` records every version of a changed set; the default loops
///   over `update`
pub trait Storage: Send + Sync {
    fn fetch_applied(&self) -> BaleenResult<Vec<VersionId>>;

    fn update(&self, version: &Version) -> BaleenResult<()>;

    fn update_all(&self, versions: &Collection) -> BaleenResult<()> {
        for version in versions.iter() {
            self.update(version)?;
        }
        Ok(())
    }
}
