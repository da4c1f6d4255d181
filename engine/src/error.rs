//! Error types for the check engine.
//!
//! `EngineError` covers both job-level failures (which stop a run before any
//! entry is processed) and per-entry I/O failures. Per-entry errors never
//! escape `run_job`: they are converted to strings and recorded on the
//! entry's outcome so the remaining entries keep running.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Source directory does not exist
    #[error("Source directory not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// Source directory is not accessible (permissions)
    #[error("Source directory access denied: {}", path.display())]
    SourceAccessDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to open or read a data file
    #[error("Failed to read file: {}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to create or write a checksum artifact
    #[error("Failed to write checksum file: {}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Checksum artifact is missing or unreadable
    #[error("Failed to read checksum file: {}", path.display())]
    ArtifactReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Path is unusable for this job
    #[error("Invalid path: {} ({reason})", path.display())]
    InvalidPath { path: PathBuf, reason: String },

    /// Failed to enumerate the source tree root
    #[error("Failed to enumerate directory: {}", path.display())]
    EnumerationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Algorithm name is not in the supported set
    #[error("Unsupported checksum algorithm '{name}' (supported: {supported})")]
    UnsupportedAlgorithm { name: String, supported: String },

    /// Name filter is not a valid glob
    #[error("Invalid file name filter '{pattern}': {source}")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// Checksum extension cannot be used to name sidecar files
    #[error("Invalid checksum extension '{extension}': {reason}")]
    InvalidExtension { extension: String, reason: String },

    /// Job is not in the state required by the requested operation
    #[error("Job must be {expected} to {operation}; current state: {actual}")]
    InvalidState {
        operation: &'static str,
        expected: &'static str,
        actual: String,
    },

    /// Failed to write the run report
    #[error("Failed to write report {}: {source}", path.display())]
    ReportError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Worker pool could not be started
    #[error("Failed to start worker pool: {message}")]
    WorkerPool { message: String },
}

impl EngineError {
    /// Human-readable message including the underlying cause, for per-entry
    /// reporting where the error chain is flattened to one line.
    pub fn detailed_message(&self) -> String {
        match std::error::Error::source(self) {
            Some(cause) if !matches!(self, Self::InvalidFilter { .. } | Self::ReportError { .. }) => {
                format!("{}: {}", self, cause)
            }
            _ => self.to_string(),
        }
    }
}
