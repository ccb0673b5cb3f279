use baleen::errors::{BaleenError, BaleenResult, ErrorKind};
use baleen::migrator::Migrator;
use baleen::repository::InMemoryRepository;
use baleen::runner::RunOptions;
use baleen::storage::FileStorage;
use baleen::version::{Migration, OptionsAware, TransactionAware};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::{env, fs};

/// Ordered record of everything the test migrations did.
#[derive(Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.into());
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

/// Behavior of a [ScriptedMigration].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Script {
    #[default]
    Succeed,
    FailUp,
    FailDown,
}

/// Migration recording its calls in a [Journal].
///
/// Records `up:<name>` and `down:<name>`, the options it was handed as
/// `options:<name>:<direction>`, and, when transactional, `begin`, `finish`
/// and `abort` entries.
pub struct ScriptedMigration {
    name: String,
    file: Option<String>,
    journal: Journal,
    script: Script,
    transactional: bool,
    fail_abort: bool,
}

impl ScriptedMigration {
    pub fn new(name: &str, journal: &Journal) -> Self {
        ScriptedMigration {
            name: name.to_string(),
            file: None,
            journal: journal.clone(),
            script: Script::Succeed,
            transactional: false,
            fail_abort: false,
        }
    }

    pub fn script(mut self, script: Script) -> Self {
        self.script = script;
        self
    }

    pub fn transactional(mut self) -> Self {
        self.transactional = true;
        self
    }

    pub fn failing_abort(mut self) -> Self {
        self.fail_abort = true;
        self
    }

    pub fn file(mut self, file: &str) -> Self {
        self.file = Some(file.to_string());
        self
    }

    pub fn shared(self) -> Arc<dyn Migration> {
        Arc::new(self)
    }

    fn step(&self, step: &str, fail: bool) -> BaleenResult<()> {
        self.journal.record(format!("{}:{}", step, self.name));
        if fail {
            Err(BaleenError::new(
                &format!("{} of {} failed", step, self.name),
                ErrorKind::MigrationFailed,
            ))
        } else {
            Ok(())
        }
    }
}

impl Migration for ScriptedMigration {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn up(&self) -> BaleenResult<()> {
        self.step("up", self.script == Script::FailUp)
    }

    fn down(&self) -> BaleenResult<()> {
        self.step("down", self.script == Script::FailDown)
    }

    fn source_file(&self) -> Option<String> {
        self.file.clone()
    }

    fn as_options_aware(&self) -> Option<&dyn OptionsAware> {
        Some(self)
    }

    fn as_transaction_aware(&self) -> Option<&dyn TransactionAware> {
        if self.transactional {
            Some(self)
        } else {
            None
        }
    }
}

impl OptionsAware for ScriptedMigration {
    fn set_options(&self, options: &RunOptions) {
        self.journal
            .record(format!("options:{}:{}", self.name, options.direction()));
    }
}

impl TransactionAware for ScriptedMigration {
    fn begin(&self) -> BaleenResult<()> {
        self.step("begin", false)
    }

    fn finish(&self) -> BaleenResult<()> {
        self.step("finish", false)
    }

    fn abort(&self) -> BaleenResult<()> {
        self.step("abort", self.fail_abort)
    }
}

/// Plain migrations named after `names`, all recording into `journal`.
pub fn scripted(names: &[&str], journal: &Journal) -> Vec<Arc<dyn Migration>> {
    names
        .iter()
        .map(|name| ScriptedMigration::new(name, journal).shared())
        .collect()
}

/// Keeps only the `up:`/`down:` entries of a journal.
pub fn runs(journal: &Journal) -> Vec<String> {
    journal
        .entries()
        .into_iter()
        .filter(|e| e.starts_with("up:") || e.starts_with("down:"))
        .collect()
}

pub fn random_path() -> PathBuf {
    let id = uuid::Uuid::new_v4();
    env::temp_dir().join(format!("baleen-{}", id)).join("applied.txt")
}

/// A migrator over scripted migrations with file storage in a temporary
/// directory.
pub struct TestContext {
    path: PathBuf,
    journal: Journal,
    migrations: Vec<Arc<dyn Migration>>,
}

impl TestContext {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Builds a fresh migrator over the same migrations and storage file,
    /// the way a new process would.
    pub fn migrator(&self) -> BaleenResult<Migrator> {
        Migrator::builder()
            .repository(InMemoryRepository::with_migrations(self.migrations.clone()))
            .storage(FileStorage::new(&self.path))
            .build()
    }

    /// Lines of the storage file, empty if it does not exist yet.
    pub fn stored_ids(&self) -> Vec<String> {
        fs::read_to_string(&self.path)
            .map(|content| content.lines().map(|l| l.to_string()).collect())
            .unwrap_or_default()
    }
}

pub fn create_test_context(names: &[&str]) -> TestContext {
    let journal = Journal::new();
    let migrations = scripted(names, &journal);
    create_context_with(migrations, journal)
}

pub fn create_context_with(migrations: Vec<Arc<dyn Migration>>, journal: Journal) -> TestContext {
    TestContext {
        path: random_path(),
        journal,
        migrations,
    }
}

pub fn cleanup(ctx: &TestContext) {
    if let Some(parent) = ctx.path.parent() {
        if let Err(e) = fs::remove_dir_all(parent) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove test directory {:?}: {:?}", parent, e);
            }
        }
    }
}

/// Runs `test` against a context over plain migrations named after `names`
/// and always cleans it up afterwards.
pub fn run_test<T>(names: &[&str], test: T)
where
    T: FnOnce(&TestContext) -> BaleenResult<()>,
{
    run_in_context(create_test_context(names), test)
}

/// Runs `test` against `ctx` and always cleans it up afterwards.
pub fn run_in_context<T>(ctx: TestContext, test: T)
where
    T: FnOnce(&TestContext) -> BaleenResult<()>,
{
    let result = {
        let ctx = &ctx;
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| test(ctx)))
    };
    cleanup(&ctx);

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => panic!("Test failed: {:?}", e),
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
