//! Progress reporting trait.
//!
//! This module defines the ProgressCallback trait, which decouples the check
//! engine from any specific front end. Entries are processed on a worker
//! pool, so callbacks may arrive from several threads at once and in any
//! order across entries; events for a single entry are always delivered in
//! order from the thread processing it.

use crate::model::{CheckJob, CheckResult, FileEntry, RunSummary};
use std::path::Path;

/// Which file a verification was run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckTarget {
    /// The source file, checked against its own artifact
    Source,
    /// The mirrored destination file, checked against the source's artifact
    Destination,
}

/// A notable per-entry event.
#[derive(Debug, Clone, Copy)]
pub enum CheckEvent<'a> {
    /// No artifact exists for this file; one is about to be created
    ArtifactMissing { path: &'a Path },

    /// Artifact created
    ArtifactCreated { path: &'a Path, artifact: &'a Path },

    /// A file is about to be verified
    Checking { target: CheckTarget, path: &'a Path },

    /// Verification finished (match, mismatch, missing or failed)
    Checked {
        target: CheckTarget,
        path: &'a Path,
        result: &'a CheckResult,
    },

    /// The entry could not be processed at all
    EntryFailed { path: &'a Path, message: &'a str },
}

/// Trait for receiving progress updates from a check job.
///
/// Implementations must be thread-safe; see the module docs.
pub trait ProgressCallback: Send + Sync {
    /// Called once, after planning and before any entry is processed.
    fn on_job_started(&self, job: &CheckJob);

    /// Called for each notable event while an entry is processed.
    fn on_event(&self, event: &CheckEvent<'_>);

    /// Called when an entry is done. `completed` counts finished entries
    /// across all workers, including this one.
    fn on_entry_completed(&self, entry: &FileEntry, completed: usize, total: usize);

    /// Called once, after every entry is processed.
    fn on_job_completed(&self, job: &CheckJob, summary: &RunSummary);
}
