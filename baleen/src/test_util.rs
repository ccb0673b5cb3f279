use crate::collection::Collection;
use crate::errors::{BaleenError, BaleenResult, ErrorKind};
use crate::version::{Migration, Version, VersionId};
use parking_lot::Mutex;
use std::sync::Arc;

pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

pub(crate) fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub(crate) struct TestMigration {
    name: String,
    file: Option<String>,
    log: CallLog,
    fail: bool,
}

impl TestMigration {
    pub(crate) fn new(name: &str) -> Arc<dyn Migration> {
        Self::logged(name, &call_log())
    }

    pub(crate) fn logged(name: &str, log: &CallLog) -> Arc<dyn Migration> {
        Arc::new(TestMigration {
            name: name.to_string(),
            file: None,
            log: log.clone(),
            fail: false,
        })
    }

    pub(crate) fn failing(name: &str, log: &CallLog) -> Arc<dyn Migration> {
        Arc::new(TestMigration {
            name: name.to_string(),
            file: None,
            log: log.clone(),
            fail: true,
        })
    }

    pub(crate) fn with_file(name: &str, file: &str) -> Arc<dyn Migration> {
        Arc::new(TestMigration {
            name: name.to_string(),
            file: Some(file.to_string()),
            log: call_log(),
            fail: false,
        })
    }

    fn record(&self, direction: &str) -> BaleenResult<()> {
        if self.fail {
            return Err(BaleenError::new(
                &format!("{} failed going {}", self.name, direction),
                ErrorKind::MigrationFailed,
            ));
        }
        self.log.lock().push(format!("{}:{}", direction, self.name));
        Ok(())
    }
}

impl Migration for TestMigration {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn up(&self) -> BaleenResult<()> {
        self.record("up")
    }

    fn down(&self) -> BaleenResult<()> {
        self.record("down")
    }

    fn source_file(&self) -> Option<String> {
        self.file.clone()
    }
}

/// Builds a version whose id and migration name are both `id`.
pub(crate) fn version(id: &str, applied: bool) -> Version {
    version_logged(id, applied, &call_log())
}

pub(crate) fn version_logged(id: &str, applied: bool, log: &CallLog) -> Version {
    let version_id = VersionId::new(id).unwrap();
    Version::new(version_id, TestMigration::logged(id, log)).with_applied(applied)
}

/// Builds a sorted collection from `(id, applied)` pairs.
pub(crate) fn sorted_collection(layout: &[(&str, bool)]) -> Collection {
    logged_collection(layout, &call_log())
}

pub(crate) fn logged_collection(layout: &[(&str, bool)], log: &CallLog) -> Collection {
    let versions = layout
        .iter()
        .map(|(id, applied)| version_logged(id, *applied, log))
        .collect::<Vec<_>>();
    let mut collection = Collection::with_versions(versions).unwrap();
    collection.sort();
    collection
}

pub(crate) fn ids(collection: &Collection) -> Vec<String> {
    collection.iter().map(|v| v.id().to_string()).collect()
}
