//! Source tree traversal.
//!
//! Walks the source root, keeps regular files whose name matches the glob
//! filter, and always drops files whose name ends with the checksum
//! extension so artifacts are never treated as data.

use crate::error::EngineError;
use globset::{Glob, GlobMatcher};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Name filter plus extension-exclusion rule.
#[derive(Debug, Clone)]
pub struct EntryFilter {
    matcher: GlobMatcher,
    extension: String,
}

impl EntryFilter {
    pub fn new(pattern: &str, extension: &str) -> Result<Self, EngineError> {
        let matcher = Glob::new(pattern)
            .map_err(|source| EngineError::InvalidFilter {
                pattern: pattern.to_string(),
                source,
            })?
            .compile_matcher();

        Ok(EntryFilter {
            matcher,
            extension: extension.to_string(),
        })
    }

    /// True if a file with this name is a data file for this job.
    ///
    /// The exclusion is a plain suffix test on the name, so `notes.checksum`
    /// and `mychecksum` are both skipped for the default extension.
    pub fn accepts(&self, file_name: &OsStr) -> bool {
        let name = file_name.to_string_lossy();
        if name.ends_with(self.extension.as_str()) {
            return false;
        }
        self.matcher.is_match(Path::new(file_name))
    }
}

/// Enumerate data files under `root`, returned as paths relative to `root`.
///
/// Order is stable (sorted by file name within each directory). Symlinks are
/// not followed into directories; a symlink to a regular file is included.
///
/// # Errors
/// Returns `EnumerationFailed` if the root itself cannot be read. Unreadable
/// subdirectories are logged and skipped.
pub fn enumerate_entries(root: &Path, filter: &EntryFilter) -> Result<Vec<PathBuf>, EngineError> {
    let mut entries = Vec::new();

    for item in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = match item {
            Ok(entry) => entry,
            Err(e) => {
                let at_root = e.depth() == 0;
                let path = e.path().unwrap_or(root).to_path_buf();
                let message = e.to_string();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message.clone()));

                if at_root {
                    return Err(EngineError::EnumerationFailed { path, source });
                }
                warn!(path = %path.display(), error = %message, "skipping unreadable entry");
                continue;
            }
        };

        if !is_regular_file(&entry) {
            continue;
        }

        if !filter.accepts(entry.file_name()) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| EngineError::InvalidPath {
                path: entry.path().to_path_buf(),
                reason: format!("not under source root {}", root.display()),
            })?;
        entries.push(relative.to_path_buf());
    }

    Ok(entries)
}

fn is_regular_file(entry: &walkdir::DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    file_type.is_symlink()
        && fs::metadata(entry.path())
            .map(|metadata| metadata.is_file())
            .unwrap_or(false)
}
