use crate::collection::Collection;
use crate::errors::{BaleenError, BaleenResult, BatchError, BatchResult, ErrorKind};
use crate::event::MigrationEventBus;
use crate::runner::{CollectionRunner, Direction, MigrationRunner, Pipeline, RunOptions, RunResult};
use crate::version::Version;

/// Converges a collection toward a goal version.
///
/// # Purpose
/// The timeline owns a sorted [Collection] and decides which of its versions
/// must run, and in which order, to move the applied state toward a goal.
/// Execution itself is delegated to a [CollectionRunner].
///
/// # Operations
/// - [Timeline::up_towards]: applies every not-applied version up to and
///   including the goal, in ascending order
/// - [Timeline::down_towards]: reverts every applied version from the end
///   down to and including the goal, in descending order
/// - [Timeline::go_towards]: both of the above, so that exactly the versions
///   up to the goal end up applied
/// - [Timeline::run_single]: runs one version regardless of its position
///
/// # Characteristics
/// - Batch operations return the versions they actually changed, or a
///   [BatchError] holding the versions changed before the failure
/// - The resolution cache of the collection is cleared after every run.
///   Other collections sharing the same versions drop their stale entries
///   on the next lookup
/// - Versions are shared handles, so the applied flags of the collection
///   are updated in place
pub struct Timeline {
    collection: Collection,
    runner: CollectionRunner,
}

impl Timeline {
    /// Creates a timeline over `collection`, running versions through
    /// `pipeline` and publishing to `event_bus`.
    pub fn new(collection: Collection, pipeline: Pipeline, event_bus: MigrationEventBus) -> Self {
        Timeline::with_runner(
            collection,
            CollectionRunner::new(MigrationRunner::new(pipeline, event_bus)),
        )
    }

    pub fn with_runner(collection: Collection, runner: CollectionRunner) -> Self {
        Timeline { collection, runner }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn into_collection(self) -> Collection {
        self.collection
    }

    /// Applies every not-applied version positioned at or before `goal`.
    ///
    /// The direction of `options` is forced to `Up`. With `forced` set,
    /// already applied versions up to the goal run again. Versions after the
    /// goal are never touched.
    ///
    /// # Errors
    /// - `CollectionNotSorted` if the collection was mutated after sorting
    /// - `NotFound` if `goal` is not part of the collection
    /// - the first error of the batch, with the versions changed before it
    pub fn up_towards(&self, goal: &Version, options: &RunOptions) -> BatchResult {
        let options = options.with_direction(Direction::Up);
        let goal_position = self.goal_position(goal)?;
        let forced = options.is_forced();

        let selection = self
            .collection
            .slice(1, goal_position)
            .filter(|v| forced || !v.is_applied());

        self.run_batch(goal, &selection, &options)
    }

    /// Reverts every applied version positioned at or after `goal`, starting
    /// from the last one.
    ///
    /// The direction of `options` is forced to `Down`. With `forced` set,
    /// not-applied versions from the goal on run down as well.
    ///
    /// # Errors
    /// Same as [Timeline::up_towards].
    pub fn down_towards(&self, goal: &Version, options: &RunOptions) -> BatchResult {
        let options = options.with_direction(Direction::Down);
        let goal_position = self.goal_position(goal)?;
        let forced = options.is_forced();

        let mut selection = self
            .collection
            .slice(goal_position, self.collection.len())
            .filter(|v| forced || v.is_applied());
        selection.sort_with(self.collection.comparator().reverse());

        self.run_batch(goal, &selection, &options)
    }

    /// Moves the applied state so that exactly the versions at or before
    /// `goal` are applied.
    ///
    /// Runs [Timeline::up_towards] to the goal, then [Timeline::down_towards]
    /// to the version right after the goal, if there is one. The result is
    /// the union of both changed sets in ascending order.
    ///
    /// # Errors
    /// Same as [Timeline::up_towards]. If the down pass fails, the error
    /// carries the union of both passes' changes.
    pub fn go_towards(&self, goal: &Version, options: &RunOptions) -> BatchResult {
        let mut changed = self.up_towards(goal, options)?;

        let goal_position = self.goal_position(goal)?;
        let next = match self.collection.get_by_position(goal_position + 1) {
            Some(next) => next.clone(),
            None => return Ok(changed),
        };

        match self.down_towards(&next, options) {
            Ok(down) => {
                changed.merge(&down);
                changed.sort();
                Ok(changed)
            }
            Err(e) => {
                changed.merge(&e.changed);
                changed.sort();
                Err(BatchError::with_changed(changed, e.error))
            }
        }
    }

    /// Runs a single version of the collection in the direction of
    /// `options`.
    ///
    /// # Errors
    /// - `NotFound` if `version` is not part of the collection
    /// - any error of [MigrationRunner::run]
    pub fn run_single(&self, version: &Version, options: &RunOptions) -> BaleenResult<RunResult> {
        if !self.collection.has(version.id().as_str()) {
            return Err(Self::not_found(version));
        }

        let result = self.runner.runner().run(version, options);
        self.collection.clear_resolution_cache();
        result
    }

    fn run_batch(&self, goal: &Version, selection: &Collection, options: &RunOptions) -> BatchResult {
        log::debug!(
            "Selected {} of {} version(s) to go {} towards {}",
            selection.len(),
            self.collection.len(),
            options.direction(),
            goal
        );
        let result = self.runner.run(goal, selection, options);
        self.collection.clear_resolution_cache();
        result
    }

    fn goal_position(&self, goal: &Version) -> BaleenResult<usize> {
        self.collection.ensure_sorted()?;
        self.collection
            .position(goal.id().as_str())
            .ok_or_else(|| Self::not_found(goal))
    }

    fn not_found(version: &Version) -> BaleenError {
        log::error!("Version {} is not part of the timeline", version);
        BaleenError::new(
            &format!("Version {} is not part of the timeline", version),
            ErrorKind::NotFound,
        )
    }
}
