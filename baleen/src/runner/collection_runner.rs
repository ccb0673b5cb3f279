use crate::collection::Collection;
use crate::errors::{BatchError, BatchResult};
use crate::event::{MigrationEvent, MigrationEventKind};
use crate::runner::{MigrationRunner, Progress, RunOptions, RunResult};
use crate::version::Version;

/// Runs a selected sub-collection of versions, one after the other.
///
/// # Purpose
/// The collection runner walks a selection prepared by the
/// [Timeline](crate::runner::Timeline) and hands each member to a
/// [MigrationRunner], reporting progress along the way.
///
/// # Behavior
/// - The selection must be sorted; it is walked in its current order
/// - `BeforeCollection` is published with the whole selection, then every
///   member runs with `Progress(total, current)` where `current` counts the
///   processed members, skipped ones included. `BeforeMigration` reports the
///   count before the member, `AfterMigration` the count including it
/// - `AfterCollection` is published with the versions actually changed
/// - The first error stops the batch; the versions changed before it are
///   returned inside the [BatchError]
/// - An empty selection returns an empty changed set without publishing
///   anything
#[derive(Clone, Debug, Default)]
pub struct CollectionRunner {
    runner: MigrationRunner,
}

impl CollectionRunner {
    pub fn new(runner: MigrationRunner) -> Self {
        CollectionRunner { runner }
    }

    pub fn runner(&self) -> &MigrationRunner {
        &self.runner
    }

    /// Runs `selection` towards `target`.
    ///
    /// # Arguments
    ///
    /// * `target` - the goal of the batch, reported in collection events
    /// * `selection` - the versions to run, in execution order
    /// * `options` - the options every member runs with
    ///
    /// # Returns
    ///
    /// The sub-collection of versions whose applied flag was changed, in
    /// execution order.
    pub fn run(&self, target: &Version, selection: &Collection, options: &RunOptions) -> BatchResult {
        selection.ensure_sorted()?;

        let mut changed = selection.filter(|_| false);
        if selection.is_empty() {
            log::debug!("Nothing to run {} towards {}", options.direction(), target);
            return Ok(changed);
        }

        let total = selection.len();
        let mut progress = Progress::new(total, 0)?;
        log::debug!(
            "Running {} version(s) {} towards {}",
            total,
            options.direction(),
            target
        );
        self.publish(
            MigrationEventKind::BeforeCollection,
            target,
            options,
            selection,
            progress,
        );

        for (index, version) in selection.iter().enumerate() {
            let before = progress;
            progress = match progress.update(index + 1) {
                Ok(progress) => progress,
                Err(e) => return Err(BatchError::with_changed(changed, e)),
            };

            match self.runner.run_with_progress(version, options, Some((before, progress))) {
                Ok(RunResult::Changed(version)) => changed.push_ordered(version),
                Ok(RunResult::Skipped(_)) => {}
                Err(e) => {
                    log::error!(
                        "Batch towards {} stopped at {} after {} change(s)",
                        target,
                        version,
                        changed.len()
                    );
                    return Err(BatchError::with_changed(changed, e));
                }
            }
        }

        self.publish(
            MigrationEventKind::AfterCollection,
            target,
            options,
            &changed,
            progress,
        );
        Ok(changed)
    }

    fn publish(
        &self,
        kind: MigrationEventKind,
        target: &Version,
        options: &RunOptions,
        collection: &Collection,
        progress: Progress,
    ) {
        let bus = self.runner.event_bus();
        if bus.has_listeners() {
            bus.publish(MigrationEvent::for_collection(
                kind,
                target.clone(),
                options.clone(),
                collection.clone(),
                Some(progress),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::event::{MigrationEventBus, MigrationEventListener};
    use crate::runner::Pipeline;
    use crate::test_util::{call_log, ids, logged_collection, sorted_collection, TestMigration};
    use crate::version::VersionId;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn runner_with_events() -> (CollectionRunner, Arc<Mutex<Vec<String>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let bus = MigrationEventBus::new();
        let sink = events.clone();
        bus.register(MigrationEventListener::new(move |event: MigrationEvent| {
            let progress = event.progress().map(|p| p.to_string()).unwrap_or_default();
            let size = event.collection().map(|c| format!("[{}]", c.len())).unwrap_or_default();
            sink.lock().push(format!(
                "{}:{}{}:{}",
                event.kind(),
                event.target(),
                size,
                progress
            ));
            Ok(())
        }));
        let runner = MigrationRunner::new(Pipeline::default(), bus);
        (CollectionRunner::new(runner), events)
    }

    #[test]
    fn test_run_reports_progress() {
        let (runner, events) = runner_with_events();
        let selection = sorted_collection(&[("v1", false), ("v2", false)]);
        let target = selection.find_or_fail("v2").unwrap();

        let changed = runner.run(&target, &selection, &RunOptions::up()).unwrap();

        assert_eq!(ids(&changed), vec!["v1", "v2"]);
        assert_eq!(
            events.lock().clone(),
            vec![
                "before-collection:v2[2]:0/2",
                "before-migration:v1:0/2",
                "after-migration:v1:1/2",
                "before-migration:v2:1/2",
                "after-migration:v2:2/2",
                "after-collection:v2[2]:2/2",
            ]
        );
    }

    #[test]
    fn test_skipped_members_count_as_processed() {
        let (runner, events) = runner_with_events();
        let selection = sorted_collection(&[("v1", true), ("v2", false)]);
        let target = selection.find_or_fail("v2").unwrap();
        let options = RunOptions::up().with_exception_on_skip(false);

        let changed = runner.run(&target, &selection, &options).unwrap();

        assert_eq!(ids(&changed), vec!["v2"]);
        assert_eq!(
            events.lock().clone(),
            vec![
                "before-collection:v2[2]:0/2",
                "before-migration:v2:1/2",
                "after-migration:v2:2/2",
                "after-collection:v2[1]:2/2",
            ]
        );
    }

    #[test]
    fn test_empty_selection_publishes_nothing() {
        let (runner, events) = runner_with_events();
        let collection = sorted_collection(&[("v1", true)]);
        let target = collection.find_or_fail("v1").unwrap();
        let selection = collection.filter(|v| !v.is_applied());

        let changed = runner.run(&target, &selection, &RunOptions::up()).unwrap();
        assert!(changed.is_empty());
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_unsorted_selection_is_rejected() {
        let runner = CollectionRunner::default();
        let mut selection = sorted_collection(&[("v1", false)]);
        selection
            .add(crate::test_util::version("v2", false))
            .unwrap();
        let target = selection.find_or_fail("v2").unwrap();

        let error = runner.run(&target, &selection, &RunOptions::up()).unwrap_err();
        assert_eq!(error.kind(), &ErrorKind::CollectionNotSorted);
        assert!(error.changed.is_empty());
    }

    #[test]
    fn test_failure_returns_versions_changed_before() {
        let log = call_log();
        let mut selection = logged_collection(&[("v1", false), ("v2", false), ("v4", false)], &log);
        let broken = Version::new(VersionId::new("v3").unwrap(), TestMigration::failing("v3", &log));
        selection.add(broken.clone()).unwrap();
        selection.sort();
        let target = selection.last().cloned().unwrap();

        let error = CollectionRunner::default()
            .run(&target, &selection, &RunOptions::up())
            .unwrap_err();

        assert_eq!(error.kind(), &ErrorKind::MigrationFailed);
        assert_eq!(ids(&error.changed), vec!["v1", "v2"]);
        assert!(!broken.is_applied());
        assert!(!selection.find_or_fail("v4").unwrap().is_applied());
        assert_eq!(log.lock().clone(), vec!["up:v1", "up:v2"]);
    }

    #[test]
    fn test_refused_skip_stops_batch() {
        let selection = sorted_collection(&[("v1", false), ("v2", true), ("v3", false)]);
        let target = selection.find_or_fail("v3").unwrap();

        let error = CollectionRunner::default()
            .run(&target, &selection, &RunOptions::up())
            .unwrap_err();

        assert_eq!(error.kind(), &ErrorKind::RefuseToRun);
        assert_eq!(ids(&error.changed), vec!["v1"]);
        assert!(!selection.find_or_fail("v3").unwrap().is_applied());
    }
}
