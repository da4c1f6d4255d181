//! Job orchestration module.
//!
//! This module provides the main job lifecycle functions:
//! - Creating a job from validated options
//! - Planning a job (enumerating the source tree)
//! - Running a job (creating missing artifacts and verifying files)

use crate::digest::compute_digest;
use crate::error::EngineError;
use crate::model::{
    ArtifactStatus, CheckJob, CheckOptions, CheckResult, EntryOutcome, FileEntry, JobState,
    RunSummary,
};
use crate::progress::{CheckEvent, CheckTarget, ProgressCallback};
use crate::store::{self, ArtifactWrite};
use crate::verify::verify;
use crate::walk::{self, EntryFilter};
use chrono::Utc;
use rayon::prelude::*;
use std::path::{Path, MAIN_SEPARATOR};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

/// Create a new check job.
///
/// Validates that the source path exists and is a directory, that the
/// extension can name a sidecar file, and that the filter is a valid glob.
/// The destination root does not have to exist: missing mirrors are
/// reported per file.
///
/// # Errors
/// Returns EngineError if any of the above checks fail
pub fn create_job(options: CheckOptions) -> Result<CheckJob, EngineError> {
    let source = options.source_root.as_path();

    match std::fs::metadata(source) {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(EngineError::InvalidPath {
                    path: source.to_path_buf(),
                    reason: "Source must be a directory".to_string(),
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(EngineError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(EngineError::SourceAccessDenied {
                path: source.to_path_buf(),
                source: e,
            });
        }
    }

    validate_extension(&options.extension)?;

    if let Some(destination) = &options.destination_root {
        if destination.as_os_str().is_empty() {
            return Err(EngineError::InvalidPath {
                path: destination.clone(),
                reason: "Destination path is empty".to_string(),
            });
        }
    }

    let filter = EntryFilter::new(&options.filter, &options.extension)?;

    Ok(CheckJob {
        id: Uuid::new_v4(),
        options,
        filter,
        entries: Vec::new(),
        state: JobState::Pending,
        created_at: Utc::now(),
        started_at: None,
        finished_at: None,
    })
}

fn validate_extension(extension: &str) -> Result<(), EngineError> {
    let reason = if extension.is_empty() {
        Some("extension must not be empty")
    } else if extension.contains('/') || extension.contains(MAIN_SEPARATOR) {
        Some("extension must not contain a path separator")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(EngineError::InvalidExtension {
            extension: extension.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Plan a job by enumerating the source tree.
///
/// Populates job.entries with every qualifying data file.
///
/// # Errors
/// Returns EngineError if the job is not Pending or the root cannot be read
pub fn plan_job(job: &mut CheckJob) -> Result<(), EngineError> {
    if job.state != JobState::Pending {
        return Err(EngineError::InvalidState {
            operation: "plan",
            expected: "Pending",
            actual: job.state.to_string(),
        });
    }

    let relative_paths = walk::enumerate_entries(&job.options.source_root, &job.filter)?;
    let destination_root = job.options.destination_root.as_deref();

    job.entries = relative_paths
        .into_iter()
        .map(|relative| {
            FileEntry::new(
                &job.options.source_root,
                relative,
                &job.options.extension,
                destination_root,
            )
        })
        .collect();

    debug!(job_id = %job.id, entries = job.entries.len(), "job planned");
    Ok(())
}

/// Run a job: create missing artifacts, then verify as configured.
///
/// Transitions job state from Pending to Running to Completed. Entries are
/// processed in parallel on a bounded worker pool; each entry is handled
/// start to finish by one worker. Individual entry errors are recorded on
/// the entry and do NOT stop the job.
///
/// # Errors
/// Returns EngineError only for job-level issues (wrong state, pool startup).
pub fn run_job(
    job: &mut CheckJob,
    progress_callback: Option<&dyn ProgressCallback>,
) -> Result<RunSummary, EngineError> {
    if job.state != JobState::Pending {
        return Err(EngineError::InvalidState {
            operation: "run",
            expected: "Pending",
            actual: job.state.to_string(),
        });
    }

    let workers = job.options.worker_count();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|index| format!("copycheck-worker-{}", index))
        .build()
        .map_err(|e| EngineError::WorkerPool {
            message: e.to_string(),
        })?;

    job.state = JobState::Running;
    job.started_at = Some(Utc::now());

    let span = info_span!("check_job", job_id = %job.id);
    span.in_scope(|| {
        info!(
            source = %job.options.source_root.display(),
            algorithm = %job.options.algorithm,
            entries = job.entries.len(),
            workers,
            "job started"
        );
    });

    if let Some(callback) = progress_callback {
        callback.on_job_started(job);
    }

    let total = job.entries.len();
    let completed = AtomicUsize::new(0);
    let options = &job.options;
    let entries = &mut job.entries;

    pool.install(|| {
        entries.par_iter_mut().for_each(|entry| {
            let outcome = span.in_scope(|| process_entry(entry, options, progress_callback));
            entry.outcome = outcome;

            let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(callback) = progress_callback {
                callback.on_entry_completed(entry, done, total);
            }
        });
    });

    job.state = JobState::Completed;
    job.finished_at = Some(Utc::now());

    let summary = RunSummary::from_entries(&job.entries);
    span.in_scope(|| {
        info!(
            created = summary.artifacts_created,
            mismatches = summary.mismatches(),
            failures = summary.failures,
            "job completed"
        );
    });

    if let Some(callback) = progress_callback {
        callback.on_job_completed(job, &summary);
    }

    Ok(summary)
}

/// Process one entry: ensure its artifact exists, then run the configured
/// verifications. Never fails; errors land in the returned outcome.
pub fn process_entry(
    entry: &FileEntry,
    options: &CheckOptions,
    progress_callback: Option<&dyn ProgressCallback>,
) -> EntryOutcome {
    let mut outcome = EntryOutcome::default();
    let source = entry.source_path.as_path();

    if store::exists(&entry.artifact_path) {
        outcome.artifact = ArtifactStatus::Existing;
    } else {
        emit(progress_callback, CheckEvent::ArtifactMissing { path: source });

        let created = compute_digest(source, options.algorithm)
            .and_then(|digest| store::create_if_absent(&entry.artifact_path, &digest));

        match created {
            Ok(ArtifactWrite::Created) => {
                info!(path = %source.display(), "checksum file created");
                outcome.artifact = ArtifactStatus::Created;
                emit(progress_callback, CheckEvent::ArtifactCreated {
                    path: source,
                    artifact: &entry.artifact_path,
                });
            }
            Ok(ArtifactWrite::AlreadyExists) => {
                debug!(path = %source.display(), "checksum file appeared concurrently, keeping it");
                outcome.artifact = ArtifactStatus::Existing;
            }
            Err(e) => {
                let message = e.detailed_message();
                warn!(path = %source.display(), error = %message, "could not create checksum file");
                outcome.artifact = ArtifactStatus::Failed;
                emit(progress_callback, CheckEvent::EntryFailed {
                    path: source,
                    message: &message,
                });
                outcome.error = Some(message);
                return outcome;
            }
        }
    }

    if options.force_check {
        emit(progress_callback, CheckEvent::Checking {
            target: CheckTarget::Source,
            path: source,
        });
        let result = check_file(source, &entry.artifact_path, options);
        log_result(CheckTarget::Source, source, &result);
        emit(progress_callback, CheckEvent::Checked {
            target: CheckTarget::Source,
            path: source,
            result: &result,
        });
        outcome.source_check = Some(result);
    }

    if let Some(destination) = entry.destination_path.as_deref() {
        let result = if destination.exists() {
            emit(progress_callback, CheckEvent::Checking {
                target: CheckTarget::Destination,
                path: destination,
            });
            check_file(destination, &entry.artifact_path, options)
        } else {
            CheckResult::Missing
        };
        log_result(CheckTarget::Destination, destination, &result);
        emit(progress_callback, CheckEvent::Checked {
            target: CheckTarget::Destination,
            path: destination,
            result: &result,
        });
        outcome.destination_check = Some(result);
    }

    outcome
}

fn emit(progress_callback: Option<&dyn ProgressCallback>, event: CheckEvent<'_>) {
    if let Some(callback) = progress_callback {
        callback.on_event(&event);
    }
}

fn check_file(path: &Path, artifact_path: &Path, options: &CheckOptions) -> CheckResult {
    match verify(path, artifact_path, options.algorithm) {
        Ok(true) => CheckResult::Match,
        Ok(false) => CheckResult::Mismatch,
        Err(e) => CheckResult::Failed {
            message: e.detailed_message(),
        },
    }
}

fn log_result(target: CheckTarget, path: &Path, result: &CheckResult) {
    match result {
        CheckResult::Match => debug!(?target, path = %path.display(), "checksum matches"),
        CheckResult::Mismatch => warn!(?target, path = %path.display(), "checksum mismatch"),
        CheckResult::Missing => debug!(?target, path = %path.display(), "file missing, not checked"),
        CheckResult::Failed { message } => {
            warn!(?target, path = %path.display(), error = %message, "verification failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::{digest_bytes, ChecksumAlgorithm};
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct Tree {
        _temp: tempfile::TempDir,
        src: PathBuf,
        dst: PathBuf,
    }

    fn tree() -> Tree {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::create_dir(&src).expect("Failed to create src dir");
        fs::create_dir(&dst).expect("Failed to create dst dir");
        Tree { _temp: temp, src, dst }
    }

    fn run(options: CheckOptions) -> (CheckJob, RunSummary) {
        let mut job = create_job(options).expect("Failed to create job");
        plan_job(&mut job).expect("Failed to plan job");
        let summary = run_job(&mut job, None).expect("Failed to run job");
        (job, summary)
    }

    fn entry<'a>(job: &'a CheckJob, name: &str) -> &'a FileEntry {
        job.entries
            .iter()
            .find(|e| e.relative_path == Path::new(name))
            .unwrap_or_else(|| panic!("no entry for {}", name))
    }

    // Test helper: records every callback invocation
    struct RecordingCallback {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingCallback {
        fn new() -> Self {
            RecordingCallback {
                calls: Mutex::new(Vec::new()),
            }
        }

        fn get_calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ProgressCallback for RecordingCallback {
        fn on_job_started(&self, job: &CheckJob) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("job_started({})", job.entries.len()));
        }

        fn on_event(&self, event: &CheckEvent<'_>) {
            let call = match event {
                CheckEvent::ArtifactMissing { .. } => "artifact_missing".to_string(),
                CheckEvent::ArtifactCreated { .. } => "artifact_created".to_string(),
                CheckEvent::Checking { target, .. } => format!("checking({:?})", target),
                CheckEvent::Checked { target, result, .. } => {
                    format!("checked({:?}, {})", target, result)
                }
                CheckEvent::EntryFailed { .. } => "entry_failed".to_string(),
            };
            self.calls.lock().unwrap().push(call);
        }

        fn on_entry_completed(&self, _entry: &FileEntry, completed: usize, total: usize) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("entry_completed({}/{})", completed, total));
        }

        fn on_job_completed(&self, _job: &CheckJob, summary: &RunSummary) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("job_completed({})", summary.entries));
        }
    }

    #[test]
    fn test_create_job_with_valid_source() {
        let t = tree();
        let job = create_job(CheckOptions::new(&t.src)).expect("Failed to create job");

        assert_eq!(job.state, JobState::Pending);
        assert!(job.entries.is_empty());
        assert!(job.started_at.is_none());
    }

    #[test]
    fn test_create_job_with_missing_source() {
        let t = tree();
        let result = create_job(CheckOptions::new(t.src.join("nonexistent")));
        assert!(matches!(result, Err(EngineError::SourceNotFound { .. })));
    }

    #[test]
    fn test_create_job_with_file_as_source() {
        let t = tree();
        let file = t.src.join("file.txt");
        fs::write(&file, "x").expect("Failed to write file");

        let result = create_job(CheckOptions::new(&file));
        assert!(matches!(result, Err(EngineError::InvalidPath { .. })));
    }

    #[test]
    fn test_create_job_rejects_bad_extension_and_filter() {
        let t = tree();

        let mut options = CheckOptions::new(&t.src);
        options.extension = String::new();
        assert!(matches!(create_job(options), Err(EngineError::InvalidExtension { .. })));

        let mut options = CheckOptions::new(&t.src);
        options.extension = "a/b".to_string();
        assert!(matches!(create_job(options), Err(EngineError::InvalidExtension { .. })));

        let mut options = CheckOptions::new(&t.src);
        options.filter = "[oops".to_string();
        assert!(matches!(create_job(options), Err(EngineError::InvalidFilter { .. })));
    }

    #[test]
    fn test_create_job_allows_missing_destination_root() {
        let t = tree();
        let mut options = CheckOptions::new(&t.src);
        options.destination_root = Some(t.dst.join("not-yet"));
        assert!(create_job(options).is_ok());
    }

    #[test]
    fn test_creates_missing_artifact_with_md5_by_default() {
        let t = tree();
        fs::write(t.src.join("a.txt"), "hello").expect("Failed to write file");

        let (job, summary) = run(CheckOptions::new(&t.src));

        let artifact = t.src.join("a.txt.checksum");
        assert_eq!(
            fs::read_to_string(&artifact).expect("Artifact should exist"),
            "5d41402abc4b2a76b9719d911017c592"
        );
        assert_eq!(job.state, JobState::Completed);
        assert!(job.finished_at.is_some());
        assert_eq!(entry(&job, "a.txt").outcome.artifact, ArtifactStatus::Created);
        assert_eq!(summary.artifacts_created, 1);
        assert_eq!(summary.entries, 1);
    }

    #[test]
    fn test_existing_artifact_is_never_overwritten() {
        let t = tree();
        fs::write(t.src.join("a.txt"), "hello").expect("Failed to write file");
        fs::write(t.src.join("a.txt.checksum"), "not-a-real-digest").expect("Failed to write artifact");

        let (job, summary) = run(CheckOptions::new(&t.src));

        assert_eq!(
            fs::read_to_string(t.src.join("a.txt.checksum")).expect("Artifact should exist"),
            "not-a-real-digest"
        );
        assert_eq!(entry(&job, "a.txt").outcome.artifact, ArtifactStatus::Existing);
        assert_eq!(summary.artifacts_existing, 1);
        assert_eq!(summary.artifacts_created, 0);
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let t = tree();
        fs::write(t.src.join("a.txt"), "hello").expect("Failed to write file");

        run(CheckOptions::new(&t.src));
        let first = fs::read_to_string(t.src.join("a.txt.checksum")).expect("Artifact should exist");

        let (_job, summary) = run(CheckOptions::new(&t.src));
        let second = fs::read_to_string(t.src.join("a.txt.checksum")).expect("Artifact should exist");

        assert_eq!(first, second);
        assert_eq!(summary.artifacts_created, 0);
        assert_eq!(summary.artifacts_existing, 1);
        // The artifact from run one must not be picked up as a data file
        assert_eq!(summary.entries, 1);
    }

    #[test]
    fn test_destination_match() {
        let t = tree();
        fs::write(t.src.join("a.txt"), "hello").expect("Failed to write file");
        fs::write(t.dst.join("a.txt"), "hello").expect("Failed to write file");

        let mut options = CheckOptions::new(&t.src);
        options.destination_root = Some(t.dst.clone());
        let (job, summary) = run(options);

        assert_eq!(
            entry(&job, "a.txt").outcome.destination_check,
            Some(CheckResult::Match)
        );
        assert_eq!(summary.destination_matches, 1);
        assert!(!summary.has_problems());
    }

    #[test]
    fn test_destination_mismatch_is_not_fatal() {
        let t = tree();
        fs::write(t.src.join("a.txt"), "hello").expect("Failed to write file");
        fs::write(t.src.join("b.txt"), "world").expect("Failed to write file");
        fs::write(t.dst.join("a.txt"), "HELLO").expect("Failed to write file");
        fs::write(t.dst.join("b.txt"), "world").expect("Failed to write file");

        let mut options = CheckOptions::new(&t.src);
        options.destination_root = Some(t.dst.clone());
        let (job, summary) = run(options);

        assert_eq!(
            entry(&job, "a.txt").outcome.destination_check,
            Some(CheckResult::Mismatch)
        );
        assert_eq!(
            entry(&job, "b.txt").outcome.destination_check,
            Some(CheckResult::Match)
        );
        assert_eq!(summary.destination_mismatches, 1);
        assert_eq!(summary.failures, 0);
    }

    #[test]
    fn test_destination_missing_file_is_reported_not_failed() {
        let t = tree();
        fs::write(t.src.join("a.txt"), "hello").expect("Failed to write file");

        let mut options = CheckOptions::new(&t.src);
        options.destination_root = Some(t.dst.clone());
        let (job, summary) = run(options);

        assert_eq!(
            entry(&job, "a.txt").outcome.destination_check,
            Some(CheckResult::Missing)
        );
        assert_eq!(summary.destination_missing, 1);
        assert_eq!(summary.failures, 0);
    }

    #[test]
    fn test_nested_destination_uses_relative_path() {
        let t = tree();
        fs::create_dir_all(t.src.join("deep").join("er")).expect("Failed to create dirs");
        fs::create_dir_all(t.dst.join("deep").join("er")).expect("Failed to create dirs");
        fs::write(t.src.join("deep").join("er").join("f.bin"), [1u8, 2, 3]).expect("write");
        fs::write(t.dst.join("deep").join("er").join("f.bin"), [1u8, 2, 3]).expect("write");

        let mut options = CheckOptions::new(&t.src);
        options.destination_root = Some(t.dst.clone());
        let (job, _summary) = run(options);

        let nested = Path::new("deep").join("er").join("f.bin");
        let item = job
            .entries
            .iter()
            .find(|e| e.relative_path == nested)
            .expect("Expected nested entry");
        assert_eq!(item.destination_path, Some(t.dst.join(&nested)));
        assert_eq!(item.outcome.destination_check, Some(CheckResult::Match));
    }

    #[test]
    fn test_force_check_detects_corrupted_artifact() {
        let t = tree();
        fs::write(t.src.join("a.txt"), "hello").expect("Failed to write file");
        fs::write(t.src.join("a.txt.checksum"), "00000000000000000000000000000000")
            .expect("Failed to write artifact");

        let mut options = CheckOptions::new(&t.src);
        options.force_check = true;
        let (job, summary) = run(options);

        assert_eq!(
            entry(&job, "a.txt").outcome.source_check,
            Some(CheckResult::Mismatch)
        );
        assert_eq!(summary.source_mismatches, 1);
    }

    #[test]
    fn test_force_check_matches_freshly_created_artifact() {
        let t = tree();
        fs::write(t.src.join("a.txt"), "hello").expect("Failed to write file");

        let mut options = CheckOptions::new(&t.src);
        options.force_check = true;
        options.algorithm = ChecksumAlgorithm::Sha256;
        let (job, summary) = run(options);

        let outcome = &entry(&job, "a.txt").outcome;
        assert_eq!(outcome.artifact, ArtifactStatus::Created);
        assert_eq!(outcome.source_check, Some(CheckResult::Match));
        assert_eq!(summary.source_matches, 1);
        assert_eq!(
            fs::read_to_string(t.src.join("a.txt.checksum")).expect("Artifact should exist"),
            digest_bytes(b"hello", ChecksumAlgorithm::Sha256)
        );
    }

    #[test]
    fn test_without_force_check_source_is_not_verified() {
        let t = tree();
        fs::write(t.src.join("a.txt"), "hello").expect("Failed to write file");
        fs::write(t.src.join("a.txt.checksum"), "bogus").expect("Failed to write artifact");

        let (job, summary) = run(CheckOptions::new(&t.src));

        assert!(entry(&job, "a.txt").outcome.source_check.is_none());
        assert!(!summary.has_problems());
    }

    #[test]
    fn test_filter_and_extension_are_applied() {
        let t = tree();
        fs::write(t.src.join("a.txt"), "a").expect("Failed to write file");
        fs::write(t.src.join("b.log"), "b").expect("Failed to write file");

        let mut options = CheckOptions::new(&t.src);
        options.filter = "*.txt".to_string();
        options.extension = "sha1".to_string();
        options.algorithm = ChecksumAlgorithm::Sha1;
        let (job, _summary) = run(options);

        assert_eq!(job.entries.len(), 1);
        assert!(t.src.join("a.txt.sha1").exists());
        assert!(!t.src.join("b.log.sha1").exists());
    }

    #[test]
    fn test_run_job_continues_on_entry_errors() {
        let t = tree();
        fs::write(t.src.join("a.txt"), "a").expect("Failed to write file");
        fs::write(t.src.join("b.txt"), "b").expect("Failed to write file");
        fs::write(t.src.join("a.txt.checksum"), "x").expect("Failed to write artifact");

        let mut options = CheckOptions::new(&t.src);
        options.destination_root = Some(t.dst.clone());
        // A directory where a file is expected makes verification fail for a.txt
        fs::create_dir(t.dst.join("a.txt")).expect("Failed to create dir");
        fs::write(t.dst.join("b.txt"), "b").expect("Failed to write file");
        let (job, summary) = run(options);

        assert!(matches!(
            entry(&job, "a.txt").outcome.destination_check,
            Some(CheckResult::Failed { .. })
        ));
        assert_eq!(
            entry(&job, "b.txt").outcome.destination_check,
            Some(CheckResult::Match)
        );
        assert_eq!(summary.failures, 1);
        assert_eq!(job.state, JobState::Completed);
    }

    #[test]
    fn test_parallel_run_creates_each_artifact_once() {
        let t = tree();
        for i in 0..64 {
            fs::write(t.src.join(format!("file{:02}.dat", i)), format!("content {}", i))
                .expect("Failed to write file");
        }

        let mut options = CheckOptions::new(&t.src);
        options.workers = Some(8);
        options.force_check = true;
        let (job, summary) = run(options);

        assert_eq!(summary.entries, 64);
        assert_eq!(summary.artifacts_created, 64);
        assert_eq!(summary.source_matches, 64);
        for item in &job.entries {
            let expected = digest_bytes(
                fs::read(&item.source_path).expect("read source").as_slice(),
                ChecksumAlgorithm::Md5,
            );
            assert_eq!(
                fs::read_to_string(&item.artifact_path).expect("read artifact"),
                expected
            );
        }
    }

    #[test]
    fn test_run_job_invokes_callbacks() {
        let t = tree();
        fs::write(t.src.join("a.txt"), "hello").expect("Failed to write file");
        fs::write(t.dst.join("a.txt"), "hello").expect("Failed to write file");

        let mut options = CheckOptions::new(&t.src);
        options.destination_root = Some(t.dst.clone());
        options.force_check = true;
        options.workers = Some(1);

        let mut job = create_job(options).expect("Failed to create job");
        plan_job(&mut job).expect("Failed to plan job");
        let progress = RecordingCallback::new();
        run_job(&mut job, Some(&progress)).expect("Failed to run job");

        assert_eq!(
            progress.get_calls(),
            vec![
                "job_started(1)",
                "artifact_missing",
                "artifact_created",
                "checking(Source)",
                "checked(Source, match)",
                "checking(Destination)",
                "checked(Destination, match)",
                "entry_completed(1/1)",
                "job_completed(1)",
            ]
        );
    }

    #[test]
    fn test_failed_artifact_creation_skips_checks() {
        let t = tree();
        let unreadable = t.src.join("ghost.txt");
        fs::write(&unreadable, "x").expect("Failed to write file");

        let mut job = create_job(CheckOptions::new(&t.src)).expect("Failed to create job");
        plan_job(&mut job).expect("Failed to plan job");
        // Removed between planning and running
        fs::remove_file(&unreadable).expect("Failed to remove file");

        let progress = RecordingCallback::new();
        let summary = run_job(&mut job, Some(&progress)).expect("Failed to run job");

        let outcome = &entry(&job, "ghost.txt").outcome;
        assert_eq!(outcome.artifact, ArtifactStatus::Failed);
        assert!(outcome.error.is_some());
        assert!(outcome.source_check.is_none());
        assert_eq!(summary.artifacts_failed, 1);
        assert_eq!(summary.failures, 1);
        assert!(!t.src.join("ghost.txt.checksum").exists());
        assert!(progress.get_calls().contains(&"entry_failed".to_string()));
    }

    #[test]
    fn test_plan_and_run_require_pending_state() {
        let t = tree();
        let mut job = create_job(CheckOptions::new(&t.src)).expect("Failed to create job");
        plan_job(&mut job).expect("Failed to plan job");

        run_job(&mut job, None).expect("First run should succeed");

        assert!(matches!(
            run_job(&mut job, None),
            Err(EngineError::InvalidState { .. })
        ));
        assert!(matches!(
            plan_job(&mut job),
            Err(EngineError::InvalidState { .. })
        ));
    }
}
