//! Integration tests for the `tables` subcommand.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cmd() -> Command {
    Command::cargo_bin("pdftables").unwrap()
}

/// Two pages: a ruled 2x2 table on page 1, a whitespace-aligned 2x3 layout
/// on page 2.
fn layout_json() -> String {
    serde_json::json!({
        "pages": [
            {
                "width": 612.0,
                "height": 792.0,
                "runs": [
                    {"text": "Name", "x": 105.0, "y": 105.0, "width": 20.0, "height": 10.0},
                    {"text": "Qty", "x": 205.0, "y": 105.0, "width": 15.0, "height": 10.0},
                    {"text": "Apple, red", "x": 105.0, "y": 125.0, "width": 50.0, "height": 10.0},
                    {"text": "3", "x": 205.0, "y": 125.0, "width": 5.0, "height": 10.0}
                ],
                "lines": [
                    {"x0": 100.0, "top": 100.0, "x1": 300.0, "bottom": 100.0},
                    {"x0": 100.0, "top": 120.0, "x1": 300.0, "bottom": 120.0},
                    {"x0": 100.0, "top": 140.0, "x1": 300.0, "bottom": 140.0},
                    {"x0": 100.0, "top": 100.0, "x1": 100.0, "bottom": 140.0},
                    {"x0": 200.0, "top": 100.0, "x1": 200.0, "bottom": 140.0},
                    {"x0": 300.0, "top": 100.0, "x1": 300.0, "bottom": 140.0}
                ]
            },
            {
                "width": 612.0,
                "height": 792.0,
                "runs": [
                    {"text": "City", "x": 10.0, "y": 10.0, "width": 20.0, "height": 10.0},
                    {"text": "Pop", "x": 100.0, "y": 10.0, "width": 15.0, "height": 10.0},
                    {"text": "Oslo", "x": 10.0, "y": 30.0, "width": 20.0, "height": 10.0},
                    {"text": "700", "x": 100.0, "y": 30.0, "width": 15.0, "height": 10.0},
                    {"text": "Bergen", "x": 10.0, "y": 50.0, "width": 30.0, "height": 10.0},
                    {"text": "285", "x": 100.0, "y": 50.0, "width": 15.0, "height": 10.0}
                ]
            }
        ]
    })
    .to_string()
}

fn write_file(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn text_output_mirrors_demo_layout() {
    let layout = write_file(&layout_json(), ".json");
    cmd()
        .arg("tables")
        .arg(layout.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Total pages: 2"))
        .stdout(predicate::str::contains("Tables in the Page 1"))
        .stdout(predicate::str::contains("Tables in the Page 2"))
        .stdout(predicate::str::contains("  Table 1: 2 rows x 2 columns"))
        .stdout(predicate::str::contains("  Table 1: 3 rows x 2 columns"))
        .stdout(predicate::str::contains("    | Name       | Qty |"))
        .stdout(predicate::str::contains("    +------------+-----+"));
}

#[test]
fn pages_option_limits_output() {
    let layout = write_file(&layout_json(), ".json");
    cmd()
        .arg("tables")
        .arg(layout.path())
        .args(["--pages", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tables in the Page 2"))
        .stdout(predicate::str::contains("Tables in the Page 1").not());
}

#[test]
fn ruled_strategy_skips_whitespace_tables() {
    let layout = write_file(&layout_json(), ".json");
    cmd()
        .arg("tables")
        .arg(layout.path())
        .args(["--strategy", "ruled"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tables in the Page 1"))
        .stdout(predicate::str::contains("Tables in the Page 2").not());
}

#[test]
fn csv_output_escapes_cells() {
    let layout = write_file(&layout_json(), ".json");
    cmd()
        .arg("tables")
        .arg(layout.path())
        .args(["--pages", "1", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Name,Qty"))
        .stdout(predicate::str::contains("\"Apple, red\",3"));
}

#[test]
fn json_output_is_parseable() {
    let layout = write_file(&layout_json(), ".json");
    let output = cmd()
        .arg("tables")
        .arg(layout.path())
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let tables: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0]["page"], 1);
    assert_eq!(tables[0]["cells"][1][0], "Apple, red");
    assert_eq!(tables[1]["page"], 2);
    assert_eq!(tables[1]["rows"], 3);
}

#[test]
fn settings_file_is_applied() {
    let layout = write_file(&layout_json(), ".json");
    let settings = write_file(r#"{"strategy": "whitespace", "min_inferred_rows": 3}"#, ".json");
    cmd()
        .arg("tables")
        .arg(layout.path())
        .arg("--settings")
        .arg(settings.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Tables in the Page 2"))
        .stdout(predicate::str::contains("Tables in the Page 1").not());
}

#[test]
fn page_without_tables_reports_none() {
    let layout = write_file(
        r#"{"pages": [{"width": 100, "height": 100, "runs": []}]}"#,
        ".json",
    );
    cmd()
        .arg("tables")
        .arg(layout.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No tables found."));
}

#[test]
fn missing_file_fails() {
    cmd()
        .args(["tables", "/nonexistent/layout.json"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: file not found"));
}

#[test]
fn malformed_layout_fails() {
    let layout = write_file(r#"{"pages": [{"width": -1, "height": 100}]}"#, ".json");
    cmd()
        .arg("tables")
        .arg(layout.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("malformed page 0"));
}

#[test]
fn out_of_range_pages_fail() {
    let layout = write_file(&layout_json(), ".json");
    cmd()
        .arg("tables")
        .arg(layout.path())
        .args(["--pages", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds document page count"));
}

#[test]
fn verbose_flag_logs_detection() {
    let layout = write_file(&layout_json(), ".json");
    cmd()
        .env_remove("RUST_LOG")
        .arg("-v")
        .arg("tables")
        .arg(layout.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("extracted tables"));
}
