//! Checksum artifact storage.
//!
//! An artifact is a sidecar file next to the data file, named
//! `<file_path>.<extension>`, whose entire content is the hex digest.
//! Nothing else is written: no newline, no file name, no algorithm tag.

use crate::error::EngineError;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Result of a create-if-absent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactWrite {
    /// The artifact did not exist and now holds the digest
    Created,
    /// An artifact was already present; it was left untouched
    AlreadyExists,
}

/// Path of the artifact for `file_path`: the extension is appended to the
/// full file name, never substituted for an existing extension.
pub fn artifact_path(file_path: &Path, extension: &str) -> PathBuf {
    let mut raw: OsString = file_path.as_os_str().to_os_string();
    raw.push(".");
    raw.push(extension);
    PathBuf::from(raw)
}

pub fn exists(artifact_path: &Path) -> bool {
    artifact_path.exists()
}

/// Write `digest` verbatim, replacing any existing content.
pub fn write(artifact_path: &Path, digest: &str) -> Result<(), EngineError> {
    let write_error = |source: io::Error| EngineError::WriteError {
        path: artifact_path.to_path_buf(),
        source,
    };

    let mut file = File::create(artifact_path).map_err(write_error)?;
    file.write_all(digest.as_bytes()).map_err(write_error)?;
    file.flush().map_err(write_error)
}

/// Read the stored digest exactly as written. No trimming is applied.
pub fn read(artifact_path: &Path) -> Result<String, EngineError> {
    fs::read_to_string(artifact_path).map_err(|source| EngineError::ArtifactReadError {
        path: artifact_path.to_path_buf(),
        source,
    })
}

/// Create the artifact only if it does not exist yet.
///
/// Uses an exclusive-create open, so concurrent callers for the same path
/// cannot both create it. If writing fails after the file was created, the
/// partial artifact is removed.
pub fn create_if_absent(artifact_path: &Path, digest: &str) -> Result<ArtifactWrite, EngineError> {
    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(artifact_path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Ok(ArtifactWrite::AlreadyExists)
        }
        Err(e) => {
            return Err(EngineError::WriteError {
                path: artifact_path.to_path_buf(),
                source: e,
            })
        }
    };

    let written = file.write_all(digest.as_bytes()).and_then(|_| file.flush());
    drop(file);

    if let Err(e) = written {
        let _ = fs::remove_file(artifact_path);
        return Err(EngineError::WriteError {
            path: artifact_path.to_path_buf(),
            source: e,
        });
    }

    Ok(ArtifactWrite::Created)
}
