//! copycheck - command-line interface for the check engine.
//!
//! Generates a sidecar checksum file for every file under a source directory
//! and optionally verifies a mirrored destination directory against them.

mod logging;

use clap::Parser;
use copycheck_engine::{
    create_job, plan_job, run_job, write_report, CheckEvent, CheckJob, CheckOptions, CheckResult,
    CheckTarget, ChecksumAlgorithm, EngineError, FileEntry, ProgressCallback, RunSummary,
    DEFAULT_EXTENSION, DEFAULT_FILTER,
};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Exit code when `--strict` is set and a file mismatched or failed.
const EXIT_PROBLEMS: i32 = 1;

/// Exit code for setup failures (same as clap's usage errors).
const EXIT_ERROR: i32 = 2;

/// Generate checksum files for a source directory and verify copies against them
#[derive(Parser, Debug)]
#[command(name = "copycheck")]
#[command(version)]
#[command(
    about = "Generates checksum files for files in a source directory and compares \
             them against files in a destination directory. Without a destination, \
             only checksum files are generated."
)]
struct Args {
    /// Path to the source directory
    #[arg(short, long, value_name = "DIR")]
    source: PathBuf,

    /// Path to the destination directory to verify against
    #[arg(short, long, value_name = "DIR")]
    destination: Option<PathBuf>,

    /// File name filter; checksum files are always excluded
    #[arg(short, long, value_name = "GLOB", default_value = DEFAULT_FILTER)]
    filter: String,

    /// Extension for the checksum files
    #[arg(short, long, value_name = "EXT", default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Checksum algorithm: md5, sha1, sha224, sha256, sha384, sha512,
    /// sha3_224, sha3_256, sha3_384, sha3_512, blake2b, blake2s, blake3
    #[arg(short, long, value_name = "NAME", default_value = "md5", value_parser = parse_algorithm)]
    algorithm: ChecksumAlgorithm,

    /// Also check each source file against its own checksum file
    #[arg(short = 'c', long)]
    force_check: bool,

    /// Number of worker threads (default: available parallelism)
    #[arg(short = 'j', long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    workers: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Write a JSON report of the run to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Exit with status 1 if any file mismatched or could not be processed
    #[arg(long)]
    strict: bool,
}

fn parse_algorithm(name: &str) -> Result<ChecksumAlgorithm, String> {
    name.parse().map_err(|e: EngineError| e.to_string())
}

/// CLI implementation of ProgressCallback: one stdout line per notable event,
/// a throttled progress bar on stderr, and a closing summary.
struct CliProgress {
    verbose: bool,
    show_bar: bool,
    start_time: Instant,
    last_progress_update: Mutex<Instant>,
}

impl CliProgress {
    const UPDATE_INTERVAL: Duration = Duration::from_millis(200);

    fn new(verbose: bool, show_bar: bool) -> Self {
        let now = Instant::now();
        CliProgress {
            verbose,
            show_bar,
            start_time: now,
            last_progress_update: Mutex::new(now),
        }
    }

    fn format_duration(elapsed: Duration) -> String {
        let secs = elapsed.as_secs();
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        let secs = secs % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, mins, secs)
        } else if mins > 0 {
            format!("{}m {}s", mins, secs)
        } else {
            format!("{}s", secs)
        }
    }

    fn progress_bar(completed: usize, total: usize) -> String {
        let percent = if total == 0 {
            100
        } else {
            (completed * 100 / total) as u32
        };
        let filled = (percent / 5) as usize;
        let empty = 20 - filled;
        format!(
            "[{}{}] {}% ({}/{} files)",
            "=".repeat(filled),
            " ".repeat(empty),
            percent,
            completed,
            total
        )
    }

    fn event_line(&self, event: &CheckEvent<'_>) -> Option<String> {
        match event {
            CheckEvent::ArtifactMissing { path } => Some(format!(
                "Checksum file does not exist for {}. Creating it...",
                path.display()
            )),
            CheckEvent::ArtifactCreated { artifact, .. } if self.verbose => {
                Some(format!("Created {}", artifact.display()))
            }
            CheckEvent::Checking { target, path } if self.verbose => Some(match target {
                CheckTarget::Source => {
                    format!("Checking file {} in the source folder...", path.display())
                }
                CheckTarget::Destination => format!("Checking file {}...", path.display()),
            }),
            CheckEvent::Checked { path, result, .. } => match result {
                CheckResult::Match => Some(format!("Checksum matches for {}.", path.display())),
                CheckResult::Mismatch => Some(format!(
                    "WARNING!!! Checksum does not match for {}.",
                    path.display()
                )),
                CheckResult::Missing if self.verbose => {
                    Some(format!("Not found in destination: {}", path.display()))
                }
                CheckResult::Missing => None,
                CheckResult::Failed { message } => {
                    Some(format!("ERROR: {}: {}", path.display(), message))
                }
            },
            CheckEvent::EntryFailed { path, message } => {
                Some(format!("ERROR: {}: {}", path.display(), message))
            }
            _ => None,
        }
    }
}

impl ProgressCallback for CliProgress {
    fn on_job_started(&self, job: &CheckJob) {
        eprintln!("Preparing check...");
        eprintln!("  Source: {}", job.options.source_root.display());
        if let Some(destination) = &job.options.destination_root {
            eprintln!("  Destination: {}", destination.display());
        }
        eprintln!("  Algorithm: {}", job.options.algorithm);
        eprintln!("  Total: {} files", job.entries.len());
        eprintln!();
    }

    fn on_event(&self, event: &CheckEvent<'_>) {
        if let Some(line) = self.event_line(event) {
            println!("{}", line);
        }
    }

    fn on_entry_completed(&self, _entry: &FileEntry, completed: usize, total: usize) {
        if !self.show_bar {
            return;
        }

        // Throttle progress updates to avoid spam, but always draw the last one
        if let Ok(mut last) = self.last_progress_update.lock() {
            if completed < total && last.elapsed() < Self::UPDATE_INTERVAL {
                return;
            }
            *last = Instant::now();
        }

        eprint!("\rProgress: {}", Self::progress_bar(completed, total));
        let _ = std::io::stderr().flush();
    }

    fn on_job_completed(&self, job: &CheckJob, summary: &RunSummary) {
        if self.show_bar {
            eprintln!();
        }
        eprintln!();
        eprintln!("Check complete!");
        eprintln!(
            "Summary: {} files, {} checksum files created, {} already present, {} failed",
            summary.entries, summary.artifacts_created, summary.artifacts_existing, summary.failures
        );

        if job.options.force_check {
            eprintln!(
                "Source check: {} OK, {} mismatch",
                summary.source_matches, summary.source_mismatches
            );
        }

        if job.options.destination_root.is_some() {
            eprintln!(
                "Destination check: {} OK, {} mismatch, {} missing",
                summary.destination_matches,
                summary.destination_mismatches,
                summary.destination_missing
            );
        }

        eprintln!("Elapsed: {}", Self::format_duration(self.start_time.elapsed()));

        if summary.mismatches() > 0 {
            eprintln!();
            eprintln!("Checksum mismatches:");
            for entry in job.entries.iter().filter(|e| e.outcome.has_mismatch()) {
                eprintln!("  {}", entry.relative_path.display());
            }
        }

        if summary.failures > 0 {
            eprintln!();
            eprintln!("Failed files:");
            for entry in job.entries.iter().filter(|e| e.outcome.is_failure()) {
                let outcome = &entry.outcome;
                let check_failure = [&outcome.source_check, &outcome.destination_check]
                    .into_iter()
                    .find_map(|check| match check {
                        Some(CheckResult::Failed { message }) => Some(message.as_str()),
                        _ => None,
                    });
                let message = outcome
                    .error
                    .as_deref()
                    .or(check_failure)
                    .unwrap_or("unknown error");
                eprintln!("  {}: {}", entry.relative_path.display(), message);
            }
        }
    }
}

/// Parse arguments, run the job, exit with a status reflecting the outcome
fn main() {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    let result = run_cli(&args);
    if let Err(msg) = &result {
        eprintln!("Error: {}", msg);
    }

    std::process::exit(exit_code(&args, &result));
}

/// Map a run result to the process exit code.
fn exit_code(args: &Args, result: &Result<RunSummary, String>) -> i32 {
    match result {
        Ok(summary) if args.strict && summary.has_problems() => EXIT_PROBLEMS,
        Ok(_) => 0,
        Err(_) => EXIT_ERROR,
    }
}

fn build_options(args: &Args) -> CheckOptions {
    CheckOptions {
        destination_root: args.destination.clone(),
        filter: args.filter.clone(),
        extension: args.extension.clone(),
        algorithm: args.algorithm,
        force_check: args.force_check,
        workers: args.workers.map(|n| n as usize),
        ..CheckOptions::new(&args.source)
    }
}

/// Main CLI logic - separated for testability
fn run_cli(args: &Args) -> Result<RunSummary, String> {
    let mut job = create_job(build_options(args)).map_err(|e| format!("Job creation failed: {}", e))?;

    plan_job(&mut job).map_err(|e| format!("Job planning failed: {}", e.detailed_message()))?;

    let show_bar = !args.verbose && std::io::stderr().is_terminal();
    let progress = CliProgress::new(args.verbose, show_bar);

    let summary =
        run_job(&mut job, Some(&progress)).map_err(|e| format!("Job execution failed: {}", e))?;

    if let Some(report_path) = &args.report {
        write_report(&job, &summary, report_path).map_err(|e| e.to_string())?;
        tracing::debug!(path = %report_path.display(), "report written");
    }

    Ok(summary)
}
