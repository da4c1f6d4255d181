//! Core data model for check jobs.
//!
//! This module defines the main data structures:
//! - CheckOptions: everything a run is configured with
//! - CheckJob: one generate-and-verify pass over a source tree
//! - FileEntry: a single data file within a job, with its outcome
//! - ArtifactStatus, CheckResult, JobState: per-entry and per-job states
//! - RunSummary: aggregate counts for a finished run

use crate::digest::ChecksumAlgorithm;
use crate::store;
use crate::walk::EntryFilter;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Default name filter: every file.
pub const DEFAULT_FILTER: &str = "*";

/// Default suffix for checksum artifacts.
pub const DEFAULT_EXTENSION: &str = "checksum";

/// Configuration of a check job.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Root directory to scan
    pub source_root: PathBuf,

    /// Mirror root to verify against (optional)
    pub destination_root: Option<PathBuf>,

    /// Glob matched against each file name
    pub filter: String,

    /// Suffix used to name artifact files
    pub extension: String,

    pub algorithm: ChecksumAlgorithm,

    /// Re-verify each source file against its own artifact
    pub force_check: bool,

    /// Worker threads; `None` uses the available parallelism
    pub workers: Option<usize>,
}

impl CheckOptions {
    /// Options for `source_root` with every other setting at its default.
    pub fn new<P: Into<PathBuf>>(source_root: P) -> Self {
        CheckOptions {
            source_root: source_root.into(),
            destination_root: None,
            filter: DEFAULT_FILTER.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            algorithm: ChecksumAlgorithm::default(),
            force_check: false,
            workers: None,
        }
    }

    /// Number of worker threads this job will use.
    pub fn worker_count(&self) -> usize {
        self.workers.filter(|n| *n > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

/// A single generate-and-verify pass over a source tree.
#[derive(Debug)]
pub struct CheckJob {
    /// Unique identifier for this run
    pub id: Uuid,

    pub options: CheckOptions,

    /// Compiled name filter and extension-exclusion rule
    pub filter: EntryFilter,

    /// All qualifying data files, in traversal order
    pub entries: Vec<FileEntry>,

    pub state: JobState,

    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// One data file under the source root.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Path relative to the source root (the entry's identity)
    pub relative_path: PathBuf,

    /// Full source path
    pub source_path: PathBuf,

    /// Sidecar artifact next to the source file
    pub artifact_path: PathBuf,

    /// Mirrored path under the destination root, if one is configured
    pub destination_path: Option<PathBuf>,

    pub outcome: EntryOutcome,
}

impl FileEntry {
    pub fn new(
        source_root: &Path,
        relative_path: PathBuf,
        extension: &str,
        destination_root: Option<&Path>,
    ) -> Self {
        let source_path = source_root.join(&relative_path);
        let artifact_path = store::artifact_path(&source_path, extension);
        let destination_path = destination_root.map(|root| root.join(&relative_path));

        FileEntry {
            relative_path,
            source_path,
            artifact_path,
            destination_path,
            outcome: EntryOutcome::default(),
        }
    }
}

/// What happened to one entry during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntryOutcome {
    pub artifact: ArtifactStatus,

    /// Set only when force-check is enabled
    pub source_check: Option<CheckResult>,

    /// Set only when a destination root is configured
    pub destination_check: Option<CheckResult>,

    /// Error that prevented the entry from being processed at all
    pub error: Option<String>,
}

impl EntryOutcome {
    /// True if any step of this entry hit an error.
    pub fn is_failure(&self) -> bool {
        self.artifact == ArtifactStatus::Failed
            || matches!(self.source_check, Some(CheckResult::Failed { .. }))
            || matches!(self.destination_check, Some(CheckResult::Failed { .. }))
    }

    /// True if either verification reported a mismatch.
    pub fn has_mismatch(&self) -> bool {
        self.source_check == Some(CheckResult::Mismatch)
            || self.destination_check == Some(CheckResult::Mismatch)
    }
}

/// State of an entry's checksum artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    /// Not yet processed
    #[default]
    Pending,
    /// Artifact was already present and was used as-is
    Existing,
    /// Artifact was created during this run
    Created,
    /// Artifact could not be created
    Failed,
}

/// Result of verifying one file against an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckResult {
    Match,
    Mismatch,
    /// Destination file does not exist (not an error)
    Missing,
    Failed { message: String },
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckResult::Match => write!(f, "match"),
            CheckResult::Mismatch => write!(f, "mismatch"),
            CheckResult::Missing => write!(f, "missing"),
            CheckResult::Failed { message } => write!(f, "failed: {}", message),
        }
    }
}

/// The state of an entire check job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Created, not yet started
    Pending,
    /// Currently executing
    Running,
    /// All entries processed (some may have failed)
    Completed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Pending => write!(f, "Pending"),
            JobState::Running => write!(f, "Running"),
            JobState::Completed => write!(f, "Completed"),
        }
    }
}

/// Aggregate counts for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub entries: usize,
    pub artifacts_created: usize,
    pub artifacts_existing: usize,
    pub artifacts_failed: usize,
    pub source_matches: usize,
    pub source_mismatches: usize,
    pub destination_matches: usize,
    pub destination_mismatches: usize,
    pub destination_missing: usize,
    /// Entries with at least one failed step
    pub failures: usize,
}

impl RunSummary {
    pub fn from_entries(entries: &[FileEntry]) -> Self {
        let mut summary = RunSummary::default();
        for entry in entries {
            summary.record(&entry.outcome);
        }
        summary
    }

    fn record(&mut self, outcome: &EntryOutcome) {
        self.entries += 1;

        match outcome.artifact {
            ArtifactStatus::Created => self.artifacts_created += 1,
            ArtifactStatus::Existing => self.artifacts_existing += 1,
            ArtifactStatus::Failed => self.artifacts_failed += 1,
            ArtifactStatus::Pending => {}
        }

        match outcome.source_check {
            Some(CheckResult::Match) => self.source_matches += 1,
            Some(CheckResult::Mismatch) => self.source_mismatches += 1,
            _ => {}
        }

        match outcome.destination_check {
            Some(CheckResult::Match) => self.destination_matches += 1,
            Some(CheckResult::Mismatch) => self.destination_mismatches += 1,
            Some(CheckResult::Missing) => self.destination_missing += 1,
            _ => {}
        }

        if outcome.is_failure() {
            self.failures += 1;
        }
    }

    /// Total mismatches across source and destination checks.
    pub fn mismatches(&self) -> usize {
        self.source_mismatches + self.destination_mismatches
    }

    /// True if any entry mismatched or failed.
    pub fn has_problems(&self) -> bool {
        self.mismatches() > 0 || self.failures > 0
    }
}
