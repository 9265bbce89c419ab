//! Check command: run the pre-upload pipeline on local CSV files.

use anyhow::bail;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use safra_check_core::config::{Config, Locale};
use safra_check_core::error::UploadError;
use safra_check_core::format::{format_file_size, format_record_count};
use safra_check_core::guard::FileDescriptor;
use safra_check_core::history::{HistorySummary, UploadHistory, UploadRecord, UploadStatus};
use safra_check_core::upload::{CsvSource, LocalCsvFile, UploadOptions, prepare_upload};

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// CSV files to check.
    #[arg(required = true)]
    pub files: Vec<Utf8PathBuf>,

    /// Parse quoted fields per RFC 4180 instead of splitting on every comma.
    #[arg(long)]
    pub strict: bool,

    /// Declared MIME type for the files (e.g. text/csv).
    #[arg(long, value_name = "MIME")]
    pub content_type: Option<String>,

    /// Message language.
    #[arg(long, value_enum)]
    pub locale: Option<Locale>,
}

/// Outcome for one file, as printed.
#[derive(Debug, Serialize)]
struct FileReport {
    file: Utf8PathBuf,
    name: String,
    size: u64,
    size_display: String,
    status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    record_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    files: Vec<FileReport>,
    summary: HistorySummary,
    pass: bool,
}

/// Check every file and report which ones may be uploaded.
#[instrument(name = "cmd_check", skip_all, fields(files = args.files.len()))]
pub fn cmd_check(
    args: CheckArgs,
    global_json: bool,
    quiet: bool,
    config: &Config,
) -> anyhow::Result<()> {
    debug!(strict = args.strict, content_type = ?args.content_type, "executing check command");

    let options = super::upload_options(config, args.strict, args.locale);
    let progress = progress_bar(args.files.len(), global_json || quiet)?;

    let mut history = UploadHistory::new();
    let mut reports = Vec::with_capacity(args.files.len());
    for path in &args.files {
        progress.set_message(path.to_string());
        reports.push(check_one(path, args.content_type.as_deref(), &options, &mut history));
        progress.inc(1);
    }
    progress.finish_and_clear();

    let summary = history.summary();
    let report = CheckReport {
        pass: summary.failed == 0,
        files: reports,
        summary,
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report, options.locale(), quiet);
    }

    if !report.pass {
        bail!(
            "{} of {} file(s) failed pre-upload checks",
            report.summary.failed,
            report.summary.total
        );
    }
    Ok(())
}

/// Run one file through the pipeline and record the attempt.
fn check_one(
    path: &Utf8Path,
    content_type: Option<&str>,
    options: &UploadOptions,
    history: &mut UploadHistory,
) -> FileReport {
    let file = match LocalCsvFile::open(path) {
        Ok(file) => file.with_content_type(content_type.map(str::to_string)),
        Err(e) => {
            let descriptor = FileDescriptor::new(path.file_name().unwrap_or(path.as_str()), 0);
            let err = UploadError::read(options.locale(), e);
            debug!(file = %path, error = %err, "file could not be opened");
            return record_failure(path, &descriptor, err.kind(), err.messages(), history);
        }
    };
    let descriptor = file.descriptor();

    match prepare_upload(file, options) {
        Ok(upload) => {
            let id = history.add(upload.pending_record());
            // Nothing is sent from the CLI; the record only moves through its lifecycle.
            let recorded = history
                .set_current(id)
                .and_then(|()| history.transition(id, UploadRecord::start_processing))
                .and_then(|()| history.transition(id, UploadRecord::complete));
            history.clear_current();
            if let Err(e) = recorded {
                tracing::warn!(error = %e, "upload record left incomplete");
            }
            report_for(path, history.get(id), &descriptor, None, Vec::new())
        }
        Err(err) => {
            debug!(file = %path, kind = err.kind(), error = %err, "file failed checks");
            record_failure(path, &descriptor, err.kind(), err.messages(), history)
        }
    }
}

fn record_failure(
    path: &Utf8Path,
    descriptor: &FileDescriptor,
    kind: &'static str,
    errors: Vec<String>,
    history: &mut UploadHistory,
) -> FileReport {
    let mut record = UploadRecord::pending(descriptor);
    if let Err(e) = record.fail(errors.join(" ")) {
        tracing::warn!(error = %e, "upload record left incomplete");
    }
    let id = history.add(record);
    report_for(path, history.get(id), descriptor, Some(kind), errors)
}

fn report_for(
    path: &Utf8Path,
    record: Option<&UploadRecord>,
    descriptor: &FileDescriptor,
    failure: Option<&'static str>,
    errors: Vec<String>,
) -> FileReport {
    FileReport {
        file: path.to_path_buf(),
        name: descriptor.name.clone(),
        size: descriptor.size,
        size_display: format_file_size(descriptor.size),
        status: record.map_or(UploadStatus::Error, |r| r.status),
        record_count: record.and_then(|r| r.record_count),
        failure,
        errors,
    }
}

fn progress_bar(len: usize, hidden: bool) -> anyhow::Result<ProgressBar> {
    if hidden || len < 2 {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(ProgressStyle::with_template(
        "{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}",
    )?);
    Ok(bar)
}

fn print_text(report: &CheckReport, locale: Locale, quiet: bool) {
    for file in &report.files {
        if file.failure.is_none() {
            if quiet {
                continue;
            }
            let records = file
                .record_count
                .map(|n| format!(", {}", format_record_count(n as u64, locale)))
                .unwrap_or_default();
            println!(
                "{} {} ({}{records})",
                "PASS:".green(),
                file.file,
                file.size_display,
            );
        } else {
            println!("{} {}", "FAIL:".red(), file.file);
            for error in &file.errors {
                println!("  {} {error}", "-".red());
            }
        }
    }

    if report.files.len() > 1 && !quiet {
        println!();
        println!(
            "{} {} checked, {} passed, {} failed ({} total)",
            "Summary:".bold(),
            report.summary.total,
            report.summary.completed,
            report.summary.failed,
            format_record_count(report.summary.records as u64, locale),
        );
    }
}
