//! Application-facing entry point of the engine.

use crate::collection::Collection;
use crate::errors::{BaleenResult, BatchError, BatchResult};
use crate::migrator_builder::MigratorBuilder;
use crate::migrator_config::MigratorConfig;
use crate::runner::{Direction, RunOptions, RunResult, Timeline};
use crate::version::Version;

/// Runs the migrations of an application against its recorded state.
///
/// # Purpose
/// The migrator wires the configured [Repository](crate::repository::Repository),
/// [Storage](crate::storage::Storage) and run policy together. Every
/// operation starts from a fresh view:
/// 1. fetch every version from the repository
/// 2. mark the versions recorded by the storage as applied
/// 3. sort with the configured comparator
/// 4. resolve the alias to a goal (`NotFound` if it does not resolve)
/// 5. run through a [Timeline]
/// 6. record the changed versions in the storage, also when the run stopped
///    part-way, unless it was a dry run
///
/// # Example
///
/// ```rust,ignore
/// let migrator = Migrator::builder()
///     .repository(repository)
///     .storage(FileStorage::new("migrations.applied"))
///     .build()?;
///
/// migrator.up("latest", &RunOptions::up())?;
/// migrator.go("HEAD~1", &RunOptions::up())?;
/// let status = migrator.status()?;
/// ```
#[derive(Clone, Debug)]
pub struct Migrator {
    config: MigratorConfig,
}

impl Migrator {
    /// Returns a builder to configure a migrator.
    pub fn builder() -> MigratorBuilder {
        MigratorBuilder::new()
    }

    pub(crate) fn new(config: MigratorConfig) -> Self {
        Migrator { config }
    }

    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    pub fn default_options(&self) -> RunOptions {
        self.config.default_options()
    }

    /// Returns every known version, sorted, with its recorded applied state.
    pub fn status(&self) -> BaleenResult<Collection> {
        self.load()
    }

    /// Applies every version up to the one `alias` resolves to.
    pub fn up(&self, alias: &str, options: &RunOptions) -> BatchResult {
        self.run_batch(alias, options, |timeline, goal, options| {
            timeline.up_towards(goal, options)
        })
    }

    /// Reverts every version from the last one down to the one `alias`
    /// resolves to.
    pub fn down(&self, alias: &str, options: &RunOptions) -> BatchResult {
        self.run_batch(alias, options, |timeline, goal, options| {
            timeline.down_towards(goal, options)
        })
    }

    /// Leaves exactly the versions up to the one `alias` resolves to
    /// applied.
    pub fn go(&self, alias: &str, options: &RunOptions) -> BatchResult {
        self.run_batch(alias, options, |timeline, goal, options| {
            timeline.go_towards(goal, options)
        })
    }

    /// Runs the single version `alias` resolves to in `direction`.
    pub fn execute(&self, alias: &str, direction: Direction, options: &RunOptions) -> BaleenResult<RunResult> {
        let options = options.with_direction(direction);
        let collection = self.load()?;
        let version = collection.find_or_fail(alias)?;
        let timeline = self.timeline(collection);

        let result = timeline.run_single(&version, &options)?;
        if result.is_changed() && !options.is_dry_run() {
            self.config.storage()?.update(result.version())?;
        }
        Ok(result)
    }

    fn run_batch(
        &self,
        alias: &str,
        options: &RunOptions,
        run: impl FnOnce(&Timeline, &Version, &RunOptions) -> BatchResult,
    ) -> BatchResult {
        let storage = self.config.storage()?;
        let collection = self.load()?;
        let goal = collection.find_or_fail(alias)?;
        log::debug!("Resolved '{}' to {}", alias, goal);

        let timeline = self.timeline(collection);
        let result = run(&timeline, &goal, options);
        if options.is_dry_run() {
            return result;
        }

        let changed = match &result {
            Ok(changed) => changed,
            Err(e) => &e.changed,
        };
        let persisted = storage.update_all(changed);

        match (result, persisted) {
            (result, Ok(())) => result,
            (Ok(changed), Err(e)) => Err(BatchError::with_changed(changed, e)),
            (Err(batch), Err(e)) => {
                log::error!("Could not record the changes of a failed run: {}", e);
                Err(batch)
            }
        }
    }

    fn load(&self) -> BaleenResult<Collection> {
        let repository = self.config.repository()?;
        let storage = self.config.storage()?;

        let mut collection = repository.fetch_all()?;
        collection.set_comparator(self.config.comparator());
        collection.set_resolver(self.config.resolver());

        for id in storage.fetch_applied()? {
            match collection.get(id.as_str()) {
                Some(version) => version.set_applied(true),
                None => log::warn!("Storage records unknown version {}", id),
            }
        }

        collection.sort();
        Ok(collection)
    }

    fn timeline(&self, collection: Collection) -> Timeline {
        Timeline::new(collection, self.config.pipeline(), self.config.event_bus())
    }
}
