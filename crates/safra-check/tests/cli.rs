//! End-to-end CLI integration tests
//!
//! These tests invoke the compiled binary as a subprocess to verify
//! that the CLI behaves correctly from a user's perspective.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
///
/// Note: `cargo_bin` is marked deprecated for edge cases involving custom
/// cargo build directories, but works correctly for standard project layouts.
#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_shows_usage() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("Options:"));
}

#[test]
fn short_help_flag_shows_usage() {
    cmd()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn version_flag_shows_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn short_version_flag_shows_version() {
    cmd()
        .arg("-V")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_only_prints_bare_version() {
    cmd()
        .arg("--version-only")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "{}\n",
            env!("CARGO_PKG_VERSION")
        )));
}

// =============================================================================
// Info Command
// =============================================================================

#[test]
fn info_shows_package_name_and_version() {
    cmd()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_NAME")))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn info_json_outputs_valid_json() {
    let output = cmd().arg("info").arg("--json").assert().success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("info --json should output valid JSON");

    assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn info_json_contains_expected_fields() {
    cmd()
        .arg("info")
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\""))
        .stdout(predicate::str::contains("\"version\""));
}

#[test]
fn info_help_shows_command_options() {
    cmd()
        .args(["info", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--json"));
}

// =============================================================================
// Global Flags
// =============================================================================

#[test]
fn quiet_flag_accepted() {
    cmd().args(["--quiet", "info"]).assert().success();
}

#[test]
fn short_quiet_flag_accepted() {
    cmd().args(["-q", "info"]).assert().success();
}

#[test]
fn verbose_flag_accepted() {
    cmd().args(["--verbose", "info"]).assert().success();
}

#[test]
fn short_verbose_flag_accepted() {
    cmd().args(["-v", "info"]).assert().success();
}

#[test]
fn multiple_verbose_flags_accepted() {
    cmd().args(["-vv", "info"]).assert().success();
}

#[test]
fn color_auto_accepted() {
    cmd().args(["--color", "auto", "info"]).assert().success();
}

#[test]
fn color_always_accepted() {
    cmd().args(["--color", "always", "info"]).assert().success();
}

#[test]
fn color_never_accepted() {
    cmd().args(["--color", "never", "info"]).assert().success();
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn no_subcommand_shows_help() {
    // arg_required_else_help makes clap print help to stderr and exit 2
    cmd()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn invalid_subcommand_shows_error() {
    cmd()
        .arg("not-a-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn invalid_flag_shows_error() {
    cmd()
        .arg("--not-a-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// =============================================================================
// Check Command
// =============================================================================

const GOOD: &str = "Id,DataAvaliacao,Propriedade,NomeCultura\n1,2024-01-15,Fazenda Norte,Soja\n2,2024-01-16,Fazenda Sul,Milho\n";

/// Write `content` to `name` inside a fresh temp dir.
fn csv_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(name);
    fs::write(&path, content).unwrap();
    (tmp, path)
}

#[test]
fn check_passes_valid_file() {
    let (_tmp, path) = csv_file("dados.csv", GOOD);
    cmd()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS:"))
        .stdout(predicate::str::contains("2 records"));
}

#[test]
fn check_fails_on_missing_columns() {
    let (_tmp, path) = csv_file("dados.csv", "Id,Propriedade\n1,Norte\n");
    cmd()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL:"))
        .stdout(predicate::str::contains(
            "Missing required columns: DataAvaliacao, NomeCultura",
        ))
        .stderr(predicate::str::contains("failed pre-upload checks"));
}

#[test]
fn check_rejects_non_csv_extension() {
    let (_tmp, path) = csv_file("dados.txt", GOOD);
    cmd()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Only CSV files are accepted"));
}

#[test]
fn check_rejects_declared_content_type() {
    let (_tmp, path) = csv_file("dados.csv", GOOD);
    cmd()
        .args([
            "check",
            path.to_str().unwrap(),
            "--content-type",
            "application/pdf",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Invalid file type."));
}

#[test]
fn check_reports_empty_file() {
    let (_tmp, path) = csv_file("vazio.csv", "");
    cmd()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Empty CSV file"));
}

#[test]
fn check_reports_header_only_file() {
    let (_tmp, path) = csv_file(
        "cabecalho.csv",
        "Id,DataAvaliacao,Propriedade,NomeCultura\n",
    );
    cmd()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("File contains no data."));
}

#[test]
fn check_portuguese_messages() {
    let (_tmp, path) = csv_file("dados.csv", "Id,Propriedade\n1,Norte\n");
    cmd()
        .args(["check", "--locale", "pt-br", path.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Colunas obrigatórias ausentes"));
}

#[test]
fn check_strict_keeps_quoted_commas() {
    let content = "Id,DataAvaliacao,Propriedade,NomeCultura\n1,2024-01-15,\"Fazenda Norte, Lote 2\",Soja\n";
    let (_tmp, path) = csv_file("dados.csv", content);

    // The default splitter breaks the quoted cell and the row becomes too wide.
    cmd()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .failure()
        .stdout(predicate::str::contains("1 row(s) with an incorrect number of columns."));

    cmd()
        .args(["check", "--strict", path.to_str().unwrap()])
        .assert()
        .success();
}

#[test]
fn check_missing_file_fails() {
    cmd()
        .args(["check", "/nonexistent/dados.csv"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed to read file:"));
}

#[test]
fn check_requires_a_file() {
    cmd()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn check_json_reports_every_file() {
    let tmp = TempDir::new().unwrap();
    let good = tmp.path().join("a.csv");
    let bad = tmp.path().join("b.csv");
    fs::write(&good, GOOD).unwrap();
    fs::write(&bad, "Id\n1\n").unwrap();

    let output = cmd()
        .args([
            "check",
            "--json",
            good.to_str().unwrap(),
            bad.to_str().unwrap(),
        ])
        .output()
        .expect("failed to run command");
    assert!(!output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("check --json should output valid JSON");
    assert_eq!(json["pass"], false);
    assert_eq!(json["summary"]["total"], 2);
    assert_eq!(json["summary"]["completed"], 1);
    assert_eq!(json["summary"]["failed"], 1);
    assert_eq!(json["summary"]["records"], 2);
    assert_eq!(json["files"][0]["status"], "completed");
    assert_eq!(json["files"][1]["failure"], "structure");
}

#[test]
fn check_quiet_hides_passing_files() {
    let (_tmp, path) = csv_file("dados.csv", GOOD);
    cmd()
        .args(["-q", "check", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// =============================================================================
// Inspect Command
// =============================================================================

#[test]
fn inspect_shows_shape() {
    let (_tmp, path) = csv_file("dados.csv", "Id,Propriedade\n1,Norte\n2\n");
    let output = cmd()
        .args(["inspect", "--json", path.to_str().unwrap()])
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_slice(&output.get_output().stdout).expect("valid JSON");
    assert_eq!(json["row_count"], 2);
    assert_eq!(json["mismatched_rows"], 1);
    assert_eq!(json["headers"], serde_json::json!(["Id", "Propriedade"]));
    assert_eq!(
        json["missing_columns"],
        serde_json::json!(["DataAvaliacao", "NomeCultura"])
    );
}

#[test]
fn inspect_text_output() {
    let (_tmp, path) = csv_file("dados.csv", GOOD);
    cmd()
        .args(["inspect", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rows"))
        .stdout(predicate::str::contains("Fazenda Norte"));
}

// =============================================================================
// Template Command
// =============================================================================

#[test]
fn template_prints_required_columns() {
    cmd()
        .arg("template")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Id,DataAvaliacao,Propriedade,NomeCultura\n",
        ));
}

#[test]
fn template_output_passes_check() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("modelo.csv");

    cmd()
        .args(["template", "--output", path.to_str().unwrap()])
        .assert()
        .success();
    cmd()
        .args(["check", path.to_str().unwrap()])
        .assert()
        .success();
}

#[test]
fn template_force_requires_output() {
    cmd()
        .args(["template", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// =============================================================================
// Chdir Flag
// =============================================================================

#[test]
fn chdir_flag_changes_directory() {
    // The -C flag should be accepted and work without error
    // We use a path that definitely exists
    cmd().args(["-C", "/tmp", "info"]).assert().success();
}

#[test]
fn chdir_nonexistent_fails() {
    cmd()
        .args(["-C", "/nonexistent/path/that/does/not/exist", "info"])
        .assert()
        .failure();
}
