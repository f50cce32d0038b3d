//! CLI integration tests for sql-cleanser.
//!
//! These tests verify command-line argument parsing, help output,
//! exit codes, and the end-to-end cleanse/compare flows over temp dirs.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

/// Get a command for the sql-cleanser binary.
fn cmd() -> Command {
    Command::cargo_bin("sql-cleanser").unwrap()
}

fn write_file(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cleanse"))
        .stdout(predicate::str::contains("compare"));
}

#[test]
fn test_cleanse_subcommand_help() {
    cmd()
        .args(["cleanse", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--input"))
        .stdout(predicate::str::contains("--out"))
        .stdout(predicate::str::contains("--direction"));
}

#[test]
fn test_compare_subcommand_help() {
    cmd()
        .args(["compare", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--base"))
        .stdout(predicate::str::contains("--target"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sql-cleanser"));
}

#[test]
fn test_global_flags_exist() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"))
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("--config"));
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_unknown_direction_exits_with_code_2() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    cmd()
        .args([
            "cleanse",
            "--input",
            input.path().to_str().unwrap(),
            "--out",
            out.path().to_str().unwrap(),
            "--direction",
            "mysql2ora",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Unsupported direction"));
}

#[test]
fn test_missing_input_directory_exits_with_code_1() {
    let out = tempfile::tempdir().unwrap();

    cmd()
        .args([
            "cleanse",
            "--input",
            "/nonexistent/input",
            "--out",
            out.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Input directory not found"));
}

#[test]
fn test_invalid_config_file_exits_with_code_1() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "config.yaml", "data_quality:\n  similarity_threshold: 2.0\n");

    cmd()
        .args([
            "--config",
            dir.path().join("config.yaml").to_str().unwrap(),
            "cleanse",
            "--input",
            dir.path().to_str().unwrap(),
            "--out",
            dir.path().join("out").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("similarity_threshold"));
}

// =============================================================================
// End-to-End Cleanse Tests
// =============================================================================

#[test]
fn test_cleanse_writes_scripts_and_reports() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    write_file(
        input.path(),
        "users.sql",
        "INSERT INTO users (id, name) VALUES (1, 'alice');\n\
         INSERT INTO users (id, name) VALUES (1, 'alice');\n\
         INSERT INTO users (id, name) VALUES (2, 'bob');\n",
    );
    write_file(
        input.path(),
        "orders.sql",
        "INSERT INTO orders (id, user_id) VALUES (10, 1);\n",
    );

    cmd()
        .args([
            "cleanse",
            "--input",
            input.path().to_str().unwrap(),
            "--out",
            out.path().to_str().unwrap(),
            "--direction",
            "pg2ora",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Duplicates removed: 1"));

    // Oracle direction writes upper-case per-table scripts.
    let users = fs::read_to_string(out.path().join("USERS.sql")).unwrap();
    assert!(users.contains("INSERT INTO USERS (ID, NAME) VALUES (1, 'alice');"));
    assert!(users.contains("-- Total records inserted: 2"));
    assert!(out.path().join("ORDERS.sql").exists());

    let summary = fs::read_to_string(out.path().join("table_summary.md")).unwrap();
    assert!(summary.contains("| users | 2 | 1 | id |"));
    assert!(out.path().join("analysis_report.md").exists());
}

#[test]
fn test_cleanse_json_summary() {
    let input = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    write_file(
        input.path(),
        "users.sql",
        "INSERT INTO users (id) VALUES (1);\n",
    );

    cmd()
        .args([
            "--output-json",
            "cleanse",
            "--input",
            input.path().to_str().unwrap(),
            "--out",
            out.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"rows\": 1"))
        .stdout(predicate::str::contains("\"direction\": \"pg2ora\""));
}

// =============================================================================
// End-to-End Compare Tests
// =============================================================================

#[test]
fn test_compare_writes_diff_artifacts() {
    let base = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    write_file(
        base.path(),
        "users.sql",
        "INSERT INTO users (id, name) VALUES (1, 'alice');\n\
         INSERT INTO users (id, name) VALUES (2, 'bob');\n",
    );
    write_file(
        target.path(),
        "users.sql",
        "INSERT INTO users (id, name) VALUES (1, 'alice');\n",
    );

    cmd()
        .args([
            "compare",
            "--base",
            base.path().to_str().unwrap(),
            "--target",
            target.path().to_str().unwrap(),
            "--out",
            out.path().to_str().unwrap(),
            "--direction",
            "pg2ora",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Missing in target: 1"));

    let report = fs::read_to_string(out.path().join("diff_report.md")).unwrap();
    assert!(report.contains("# Diff Report"));
    assert!(report.contains("- Missing in target: 1"));

    let script =
        fs::read_to_string(out.path().join("missing_records_pg2ora.sql")).unwrap();
    assert!(script.contains("INSERT INTO USERS (ID, NAME) VALUES (2, 'bob');"));

    assert!(out.path().join("diff.json").exists());
    assert!(out.path().join("migration_plan.md").exists());
    assert!(out.path().join("migration_plan.json").exists());
}

#[test]
fn test_compare_identical_dirs_reports_clean() {
    let base = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let sql = "INSERT INTO users (id) VALUES (1);\n";
    write_file(base.path(), "users.sql", sql);
    write_file(target.path(), "users.sql", sql);

    cmd()
        .args([
            "compare",
            "--base",
            base.path().to_str().unwrap(),
            "--target",
            target.path().to_str().unwrap(),
            "--out",
            out.path().to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Missing in target: 0"))
        .stdout(predicate::str::contains("Mismatches: 0"));

    let report = fs::read_to_string(out.path().join("diff_report.md")).unwrap();
    assert!(report.contains("No differences detected."));
}
