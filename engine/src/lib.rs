//! # copycheck engine - sidecar checksums and copy verification
//!
//! A headless library that computes a digest for every file under a source
//! directory, stores it next to the file as a plain-text artifact, and checks
//! source or mirrored destination files against those artifacts.
//!
//! ## Overview
//!
//! - Recursive enumeration with a name glob; artifacts are never treated as data
//! - Artifacts are created once and never overwritten
//! - Optional re-check of source files and mirror check of a destination tree
//! - Per-entry error isolation on a bounded worker pool
//! - Progress reporting via callbacks (decoupled from UI technology)
//!
//! ## Basic Usage
//!
//! ```no_run
//! use copycheck_engine::{create_job, plan_job, run_job, CheckOptions, ChecksumAlgorithm};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut options = CheckOptions::new("/data/source");
//! options.destination_root = Some("/mnt/backup/source".into());
//! options.algorithm = ChecksumAlgorithm::Sha256;
//!
//! let mut job = create_job(options)?;
//! plan_job(&mut job)?;
//! let summary = run_job(&mut job, None)?;
//!
//! println!("{} mismatches across {} files", summary.mismatches(), summary.entries);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - **digest**: Algorithm set and digest computation
//! - **store**: Checksum artifact read/write
//! - **verify**: File-against-artifact verification
//! - **walk**: Source tree traversal and filtering
//! - **model**: Core data structures (CheckJob, FileEntry, outcomes)
//! - **job**: Job orchestration (create, plan, run)
//! - **progress**: Progress callback trait
//! - **report**: JSON run report
//! - **error**: Error types

pub mod digest;
pub mod error;
pub mod job;
pub mod model;
pub mod progress;
pub mod report;
pub mod store;
pub mod verify;
pub mod walk;

// Re-export main types and functions
pub use digest::{compute_digest, digest_bytes, ChecksumAlgorithm};
pub use error::EngineError;
pub use job::{create_job, plan_job, run_job};
pub use model::{
    ArtifactStatus, CheckJob, CheckOptions, CheckResult, EntryOutcome, FileEntry, JobState,
    RunSummary, DEFAULT_EXTENSION, DEFAULT_FILTER,
};
pub use progress::{CheckEvent, CheckTarget, ProgressCallback};
pub use report::write_report;
pub use verify::verify;
