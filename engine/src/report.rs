//! Machine-readable run report.
//!
//! A finished job can be written out as pretty-printed JSON: run metadata,
//! the summary counts, and one record per entry with its pass/fail state.

use crate::error::EngineError;
use crate::model::{ArtifactStatus, CheckJob, CheckResult, RunSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub run_id: Uuid,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub algorithm: &'static str,
    pub extension: &'a str,
    pub filter: &'a str,
    pub source: String,
    pub destination: Option<String>,
    pub summary: &'a RunSummary,
    pub entries: Vec<EntryReport<'a>>,
}

#[derive(Debug, Serialize)]
pub struct EntryReport<'a> {
    pub path: String,
    pub artifact: ArtifactStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_check: Option<&'a CheckResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_check: Option<&'a CheckResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

impl<'a> RunReport<'a> {
    pub fn new(job: &'a CheckJob, summary: &'a RunSummary) -> Self {
        let entries = job
            .entries
            .iter()
            .map(|entry| EntryReport {
                path: entry.relative_path.to_string_lossy().into_owned(),
                artifact: entry.outcome.artifact,
                source_check: entry.outcome.source_check.as_ref(),
                destination_check: entry.outcome.destination_check.as_ref(),
                error: entry.outcome.error.as_deref(),
            })
            .collect();

        RunReport {
            run_id: job.id,
            started_at: job.started_at,
            finished_at: job.finished_at,
            algorithm: job.options.algorithm.name(),
            extension: &job.options.extension,
            filter: &job.options.filter,
            source: job.options.source_root.to_string_lossy().into_owned(),
            destination: job
                .options
                .destination_root
                .as_ref()
                .map(|root| root.to_string_lossy().into_owned()),
            summary,
            entries,
        }
    }
}

/// Write the report for a finished job to `path`, replacing any existing file.
///
/// Paths that are not valid UTF-8 are written lossily. The report is staged
/// in `<path>.tmp` and renamed into place, so a failed write never leaves a
/// truncated report behind.
pub fn write_report(job: &CheckJob, summary: &RunSummary, path: &Path) -> Result<(), EngineError> {
    let report_error = |source: io::Error| EngineError::ReportError {
        path: path.to_path_buf(),
        source,
    };

    let mut staged = path.as_os_str().to_os_string();
    staged.push(".tmp");
    let staged = PathBuf::from(staged);

    let report = RunReport::new(job, summary);
    let written = write_json(&staged, &report).and_then(|()| fs::rename(&staged, path));
    if let Err(err) = written {
        let _ = fs::remove_file(&staged);
        return Err(report_error(err));
    }
    Ok(())
}

fn write_json(path: &Path, report: &RunReport<'_>) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
