use crate::errors::{BaleenError, BaleenResult, ErrorKind};
use crate::runner::RunOptions;
use crate::version::Migration;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Contract for a stage of the execution pipeline.
///
/// # Purpose
/// Stages add cross-cutting behavior around the invocation of a migration
/// (option injection, transactions, timing, ...) without the migration
/// knowing about the engine.
///
/// # Behavior
/// A stage receives the migration, the run options and a [Next] handle to the
/// rest of the pipeline. It may act before and after calling
/// `next.run(...)`, or return without calling it to short-circuit the
/// invocation. Errors returned by `next` should be propagated unchanged.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to be shared through configuration.
pub trait Stage: Send + Sync {
    /// Returns the unique name of this stage.
    fn name(&self) -> String;

    fn handle(&self, migration: &dyn Migration, options: &RunOptions, next: Next<'_>) -> BaleenResult<()>;
}

/// Remainder of the pipeline after the current stage.
///
/// Once every stage has been passed, running `Next` reaches the terminal step,
/// which calls `up()` or `down()` on the migration according to the options
/// (and nothing at all on a dry run).
pub struct Next<'a> {
    stages: &'a [Arc<dyn Stage>],
}

impl Next<'_> {
    pub fn run(self, migration: &dyn Migration, options: &RunOptions) -> BaleenResult<()> {
        match self.stages.split_first() {
            Some((stage, rest)) => stage.handle(migration, options, Next { stages: rest }),
            None => execute(migration, options),
        }
    }
}

// Terminal step of every pipeline.
fn execute(migration: &dyn Migration, options: &RunOptions) -> BaleenResult<()> {
    if options.is_dry_run() {
        log::debug!("Dry run: not invoking {} on {}", options.direction(), migration.name());
        return Ok(());
    }
    if options.direction().is_up() {
        migration.up()
    } else {
        migration.down()
    }
}

/// Ordered list of stages wrapping the invocation of a migration.
///
/// # Characteristics
/// - **Ordered**: stages run in the order they were added, outermost first
/// - **Replace by name**: adding a stage whose name is present replaces it
///   in place
/// - **Cheap to clone**: stages are shared via `Arc`
///
/// The default pipeline is [OptionsStage] followed by [TransactionStage].
#[derive(Clone)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
}

impl Pipeline {
    /// Creates a pipeline without stages: migrations are invoked directly.
    pub fn new() -> Self {
        Pipeline { stages: Vec::new() }
    }

    pub fn add_stage<T: Stage + 'static>(&mut self, stage: T) {
        let stage: Arc<dyn Stage> = Arc::new(stage);
        let name = stage.name();
        match self.stages.iter().position(|s| s.name() == name) {
            Some(index) => self.stages[index] = stage,
            None => self.stages.push(stage),
        }
    }

    /// Removes a stage by name. No error if it is not present.
    pub fn remove_stage(&mut self, name: &str) {
        self.stages.retain(|s| s.name() != name);
    }

    pub fn names(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs the migration through every stage and the terminal step.
    pub fn run(&self, migration: &dyn Migration, options: &RunOptions) -> BaleenResult<()> {
        Next {
            stages: &self.stages,
        }
        .run(migration, options)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(OptionsStage);
        pipeline.add_stage(TransactionStage);
        pipeline
    }
}

impl Debug for Pipeline {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Hands the run options to options-aware migrations before continuing.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionsStage;

impl Stage for OptionsStage {
    fn name(&self) -> String {
        "OptionsStage".to_string()
    }

    fn handle(&self, migration: &dyn Migration, options: &RunOptions, next: Next<'_>) -> BaleenResult<()> {
        if let Some(aware) = migration.as_options_aware() {
            aware.set_options(options);
        }
        next.run(migration, options)
    }
}

/// Wraps transaction-aware migrations in `begin`/`finish`/`abort`.
///
/// # Behavior
/// - `begin()` runs first; if it fails the error is returned as is.
/// - When the rest of the pipeline or `finish()` fails, `abort()` is called
///   and the original error is returned.
/// - If `abort()` fails as well, a `TransactionFailed` error describing the
///   abort failure is returned, chained to the original error.
///
/// Migrations without the capability, and dry runs, pass straight through.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionStage;

impl Stage for TransactionStage {
    fn name(&self) -> String {
        "TransactionStage".to_string()
    }

    fn handle(&self, migration: &dyn Migration, options: &RunOptions, next: Next<'_>) -> BaleenResult<()> {
        let transaction = match migration.as_transaction_aware() {
            Some(transaction) if !options.is_dry_run() => transaction,
            _ => return next.run(migration, options),
        };

        transaction.begin()?;
        let result = next
            .run(migration, options)
            .and_then(|_| transaction.finish());

        match result {
            Ok(()) => Ok(()),
            Err(error) => match transaction.abort() {
                Ok(()) => Err(error),
                Err(abort_error) => {
                    log::warn!(
                        "Aborting transaction of {} failed: {}",
                        migration.name(),
                        abort_error
                    );
                    Err(BaleenError::new_with_cause(
                        &format!(
                            "Transaction of {} could not be aborted ({}) after: {}",
                            migration.name(),
                            abort_error,
                            error
                        ),
                        ErrorKind::TransactionFailed,
                        error,
                    ))
                }
            },
        }
    }
}
