use crate::collection::Collection;
use crate::errors::{BaleenError, BaleenResult, ErrorKind};
use crate::storage::Storage;
use crate::version::{Version, VersionId};
use indexmap::IndexSet;
use itertools::Itertools;
use parking_lot::Mutex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Storage keeping the applied ids in a flat text file.
///
/// # File format
/// One applied id per line, in the order the versions were applied. Blank
/// lines and surrounding whitespace are ignored when reading.
///
/// # Characteristics
/// - **Lazy**: the file and its parent directories are created on the first
///   write; a missing file reads as "nothing applied"
/// - **Whole-file writes**: every update rewrites the file, `update_all`
///   rewrites it once for the whole changed set
/// - **Serialized**: writes through the same instance are serialized; the
///   file itself is not locked against other processes
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        FileStorage {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_ids(&self) -> BaleenResult<IndexSet<VersionId>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(IndexSet::new()),
            Err(e) => return Err(self.storage_error("read", e.into())),
        };

        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(VersionId::new)
            .collect()
    }

    fn write_ids(&self, ids: &IndexSet<VersionId>) -> BaleenResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.storage_error("create", e.into()))?;
            }
        }

        let mut content = ids.iter().join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(&self.path, content).map_err(|e| self.storage_error("write", e.into()))
    }

    fn apply(ids: &mut IndexSet<VersionId>, version: &Version) {
        if version.is_applied() {
            ids.insert(version.id().clone());
        } else {
            ids.shift_remove(version.id());
        }
    }

    fn storage_error(&self, action: &str, cause: BaleenError) -> BaleenError {
        log::error!("Failed to {} {}: {}", action, self.path.display(), cause);
        BaleenError::new_with_cause(
            &format!("Failed to {} storage file {}", action, self.path.display()),
            ErrorKind::StorageError,
            cause,
        )
    }
}

impl Storage for FileStorage {
    fn fetch_applied(&self) -> BaleenResult<Vec<VersionId>> {
        Ok(self.read_ids()?.into_iter().collect())
    }

    fn update(&self, version: &Version) -> BaleenResult<()> {
        let _guard = self.write_lock.lock();
        let mut ids = self.read_ids()?;
        Self::apply(&mut ids, version);
        self.write_ids(&ids)
    }

    fn update_all(&self, versions: &Collection) -> BaleenResult<()> {
        if versions.is_empty() {
            return Ok(());
        }

        let _guard = self.write_lock.lock();
        let mut ids = self.read_ids()?;
        for version in versions.iter() {
            Self::apply(&mut ids, version);
        }
        log::debug!(
            "Recording {} change(s) in {}",
            versions.len(),
            self.path.display()
        );
        self.write_ids(&ids)
    }
}
