use crate::errors::{BaleenError, BaleenResult, ErrorKind};
use crate::event::{MigrationEvent, MigrationEventBus, MigrationEventKind};
use crate::runner::{Pipeline, Progress, RunOptions};
use crate::version::Version;

/// Outcome of running a single version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResult {
    /// The migration ran and the version's applied flag now matches the
    /// direction.
    Changed(Version),
    /// The version already matched the direction and was left untouched.
    Skipped(Version),
}

impl RunResult {
    pub fn version(&self) -> &Version {
        match self {
            RunResult::Changed(version) | RunResult::Skipped(version) => version,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, RunResult::Changed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RunResult::Skipped(_))
    }

    pub fn into_version(self) -> Version {
        match self {
            RunResult::Changed(version) | RunResult::Skipped(version) => version,
        }
    }
}

/// Runs one version through the execution pipeline.
///
/// # Purpose
/// The migration runner is the atomic unit of work of the engine. It decides
/// whether a version has to run for the requested direction, runs it and
/// records the new applied state.
///
/// # Behavior
/// A version runs when the run is forced or when its applied flag differs
/// from the direction (`Up` and not applied, or `Down` and applied).
/// Otherwise it is skipped, which is a `RefuseToRun` error when the options
/// ask for it and a [RunResult::Skipped] outcome otherwise.
///
/// A running version goes through these steps:
/// 1. publish `BeforeMigration`
/// 2. invoke the migration through the [Pipeline]
/// 3. set the applied flag to match the direction
/// 4. publish `AfterMigration`
///
/// An error from step 2 is returned right away, so a failed migration never
/// has its applied flag changed and no `AfterMigration` is published.
#[derive(Clone, Debug, Default)]
pub struct MigrationRunner {
    pipeline: Pipeline,
    event_bus: MigrationEventBus,
}

impl MigrationRunner {
    pub fn new(pipeline: Pipeline, event_bus: MigrationEventBus) -> Self {
        MigrationRunner {
            pipeline,
            event_bus,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn event_bus(&self) -> &MigrationEventBus {
        &self.event_bus
    }

    /// Decides whether `version` has to run with `options`.
    pub fn should_run(version: &Version, options: &RunOptions) -> bool {
        options.is_forced() || (options.direction().is_up() != version.is_applied())
    }

    /// Runs a single version.
    ///
    /// # Errors
    /// - `RefuseToRun` if the version is skipped and `exception_on_skip` is
    ///   set
    /// - any error raised by the pipeline or the migration itself
    pub fn run(&self, version: &Version, options: &RunOptions) -> BaleenResult<RunResult> {
        self.run_with_progress(version, options, None)
    }

    pub(crate) fn run_with_progress(
        &self,
        version: &Version,
        options: &RunOptions,
        progress: Option<(Progress, Progress)>,
    ) -> BaleenResult<RunResult> {
        let (before, after) = progress.unzip();
        let direction = options.direction();
        if !Self::should_run(version, options) {
            let state = if version.is_applied() { "up" } else { "down" };
            if options.is_exception_on_skip() {
                log::error!("Refusing to run {} on {}: already {}", direction, version, state);
                return Err(BaleenError::new(
                    &format!(
                        "Refusing to run {} on version {}: already {}",
                        direction, version, state
                    ),
                    ErrorKind::RefuseToRun,
                ));
            }
            log::debug!("Skipping {} of {}: already {}", direction, version, state);
            return Ok(RunResult::Skipped(version.clone()));
        }

        log::debug!("Running {} of {} ({})", direction, version, version.name());
        self.publish(MigrationEventKind::BeforeMigration, version, options, before);

        let migration = version.migration().clone();
        if let Err(e) = self.pipeline.run(migration.as_ref(), options) {
            log::error!("Migration {} failed going {}: {}", version.name(), direction, e);
            return Err(e);
        }

        version.set_applied(direction.is_up());
        log::info!("Migrated {} {} ({})", direction, version, version.name());

        self.publish(MigrationEventKind::AfterMigration, version, options, after);
        Ok(RunResult::Changed(version.clone()))
    }

    fn publish(
        &self,
        kind: MigrationEventKind,
        version: &Version,
        options: &RunOptions,
        progress: Option<Progress>,
    ) {
        if self.event_bus.has_listeners() {
            self.event_bus.publish(MigrationEvent::for_migration(
                kind,
                version.clone(),
                options.clone(),
                progress,
            ));
        }
    }
}
