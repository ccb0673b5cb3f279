use crate::collection::Collection;
use crate::resolver::Resolver;
use crate::version::Version;
use std::path::Path;

/// Resolves a file name (or trailing path) to the version defined in it.
///
/// The alias must carry a file extension and must match the end of the
/// migration's source file, starting either at the beginning of the path or
/// right after a path separator. `V1_init.rs` matches `db/V1_init.rs` but
/// not `db/OldV1_init.rs`. When several versions match, the alias is
/// ambiguous and stays unresolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilenameResolver;

impl FilenameResolver {
    fn matches(file: &str, alias: &str) -> bool {
        match file.strip_suffix(alias) {
            Some("") => true,
            Some(head) => head.ends_with('/') || head.ends_with('\\'),
            None => false,
        }
    }
}

impl Resolver for FilenameResolver {
    fn name(&self) -> String {
        "FilenameResolver".to_string()
    }

    fn resolve(&self, alias: &str, collection: &Collection) -> Option<Version> {
        if Path::new(alias).extension().is_none() {
            return None;
        }

        let mut candidates = collection.iter().filter(|v| {
            v.source_file()
                .map(|file| Self::matches(&file, alias))
                .unwrap_or(false)
        });
        match (candidates.next(), candidates.next()) {
            (Some(version), None) => Some(version.clone()),
            (Some(_), Some(_)) => {
                log::debug!("File name '{}' matches several versions", alias);
                None
            }
            _ => None,
        }
    }
}
