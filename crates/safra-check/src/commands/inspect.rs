//! Inspect command: show how a CSV file parses, without judging it.

use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use safra_check_core::config::Config;
use safra_check_core::format::{format_file_size, format_record_count};
use safra_check_core::guard::check_size;
use safra_check_core::parse::{ParsedTable, parse_with};
use safra_check_core::structure::{StructureRules, missing_columns};
use safra_check_core::upload::{CsvSource, LocalCsvFile};

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// CSV file to inspect.
    pub file: Utf8PathBuf,

    /// Parse quoted fields per RFC 4180 instead of splitting on every comma.
    #[arg(long)]
    pub strict: bool,

    /// Number of data rows to preview.
    #[arg(long, default_value_t = 5)]
    pub rows: usize,
}

#[derive(Debug, Serialize)]
struct InspectReport {
    file: Utf8PathBuf,
    size: u64,
    parser: &'static str,
    headers: Vec<String>,
    row_count: usize,
    mismatched_rows: usize,
    missing_columns: Vec<String>,
    preview: Vec<Vec<String>>,
}

impl InspectReport {
    fn new(
        file: Utf8PathBuf,
        size: u64,
        parser: &'static str,
        table: ParsedTable,
        rules: &StructureRules,
        preview_rows: usize,
    ) -> Self {
        let missing = missing_columns(&table, rules)
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            file,
            size,
            parser,
            row_count: table.row_count(),
            mismatched_rows: table.mismatched_rows().count(),
            missing_columns: missing,
            preview: table.rows.iter().take(preview_rows).cloned().collect(),
            headers: table.headers,
        }
    }
}

/// Print headers, row counts and structural gaps for one file.
///
/// Structural problems are reported, not treated as failures. Files over
/// the size limit, and read or parse errors, still fail the command.
#[instrument(name = "cmd_inspect", skip_all, fields(file = %args.file))]
pub fn cmd_inspect(args: InspectArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(strict = args.strict, "executing inspect command");

    let options = super::upload_options(config, args.strict, None);
    let file = LocalCsvFile::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file))?;
    let size = file.descriptor().size;
    if let Some(message) = check_size(size, options.max_file_bytes, options.locale()) {
        bail!("{}: {message}", args.file);
    }
    let text = file
        .read_text()
        .with_context(|| format!("failed to read {}", args.file))?;
    let table = parse_with(&text, options.parser)
        .with_context(|| format!("failed to parse {}", args.file))?;

    let report = InspectReport::new(
        args.file,
        size,
        options.parser.as_str(),
        table,
        &options.rules,
        args.rows,
    );

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let locale = options.locale();
    println!("{} ({})", report.file.bold(), format_file_size(report.size));
    println!("{}: {}", "Parser".dimmed(), report.parser);
    println!(
        "{}: {} ({})",
        "Columns".dimmed(),
        report.headers.len(),
        report.headers.join(", ")
    );
    println!(
        "{}: {}",
        "Rows".dimmed(),
        format_record_count(report.row_count as u64, locale)
    );
    if report.mismatched_rows > 0 {
        println!(
            "{}: {}",
            "Width mismatches".dimmed(),
            report.mismatched_rows.to_string().yellow()
        );
    }
    if !report.missing_columns.is_empty() {
        println!(
            "{}: {}",
            "Missing columns".dimmed(),
            report.missing_columns.join(", ").red()
        );
    }
    if !report.preview.is_empty() {
        println!();
        for row in &report.preview {
            println!("  {}", row.join(" | "));
        }
    }

    Ok(())
}
