//! E2E tests for the `cclosure` binary.
//!
//! Covers: analyze JSON schema, densify and sweep round traces, estimator
//! output, CSV appends, and coded errors for bad input.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test harness helpers
// ---------------------------------------------------------------------------

/// Triangle 0-1-2 with a pendant node 3 hanging off 2.
const PENDANT_TRIANGLE: &str = "# toy graph\n0 1\n1 2\n0 2\n2 3\n";

fn cclosure_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cclosure"));
    cmd.current_dir(dir);
    cmd.env("CCLOSURE_LOG", "error");
    cmd.env_remove("FORMAT");
    cmd.env_remove("CCLOSURE_TIMING");
    cmd
}

fn write_graph(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write edge list");
    path
}

fn json_lines(stdout: &[u8]) -> Vec<Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("each stdout line is JSON"))
        .collect()
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

#[test]
fn analyze_json_reports_closure_and_triangles() {
    let dir = TempDir::new().expect("temp dir");
    let graph = write_graph(dir.path(), "toy.txt", PENDANT_TRIANGLE);

    let output = cclosure_cmd(dir.path())
        .args(["analyze", "--json"])
        .arg(&graph)
        .output()
        .expect("analyze should not crash");
    assert!(
        output.status.success(),
        "analyze failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let records = json_lines(&output.stdout);
    assert_eq!(records.len(), 1);
    let report = &records[0];
    assert_eq!(report["dataset"], "toy.txt");
    assert_eq!(report["summary"]["node_count"], 4);
    assert_eq!(report["summary"]["edge_count"], 4);
    assert_eq!(report["summary"]["closure_value"], 1);
    assert_eq!(report["summary"]["triangles"], 1);
    assert_eq!(report["summary"]["wedges"], 5);
    assert_eq!(report["histogram"]["1"], 2);
    assert_eq!(report["load"]["comments"], 1);
    assert!(report.get("densify").is_none());
    assert!(report.get("estimate").is_none());
}

#[test]
fn analyze_with_estimate_and_densify() {
    let dir = TempDir::new().expect("temp dir");
    let graph = write_graph(dir.path(), "toy.txt", PENDANT_TRIANGLE);

    let output = cclosure_cmd(dir.path())
        .args(["analyze", "--json", "--estimate", "--densify", "0"])
        .arg(&graph)
        .output()
        .expect("analyze should not crash");
    assert!(output.status.success());

    let report = &json_lines(&output.stdout)[0];
    assert_eq!(report["densify"]["converged"], true);
    assert_eq!(report["densify"]["rounds"], serde_json::json!([2]));
    assert_eq!(report["estimate"]["status"], "complete");
    let estimate = report["estimate"]["value"].as_u64().expect("estimate value");
    assert!(estimate <= 1);
}

#[test]
fn analyze_text_mode_is_one_line_per_dataset() {
    let dir = TempDir::new().expect("temp dir");
    let a = write_graph(dir.path(), "a.txt", PENDANT_TRIANGLE);
    let b = write_graph(dir.path(), "b.txt", "0 1\n1 2\n");

    cclosure_cmd(dir.path())
        .args(["--format", "text", "analyze"])
        .arg(&a)
        .arg(&b)
        .assert()
        .success()
        .stdout(predicate::str::contains("dataset=a.txt").and(predicate::str::contains("closure=1")))
        .stdout(predicate::str::contains("dataset=b.txt").and(predicate::str::contains("transitivity=0")));
}

#[test]
fn analyze_uses_datasets_from_project_config() {
    let dir = TempDir::new().expect("temp dir");
    let data = dir.path().join("data");
    fs::create_dir(&data).expect("data dir");
    write_graph(&data, "toy.txt", PENDANT_TRIANGLE);
    fs::write(
        dir.path().join("cclosure.toml"),
        "[data]\ndir = \"data\"\ndatasets = [\"toy.txt\"]\n",
    )
    .expect("write config");

    let output = cclosure_cmd(dir.path())
        .args(["analyze", "--json"])
        .output()
        .expect("analyze should not crash");
    assert!(
        output.status.success(),
        "analyze failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(json_lines(&output.stdout)[0]["dataset"], "toy.txt");
}

#[test]
fn analyze_without_datasets_fails() {
    let dir = TempDir::new().expect("temp dir");
    cclosure_cmd(dir.path())
        .args(["analyze"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1002"));
}

// ---------------------------------------------------------------------------
// errors
// ---------------------------------------------------------------------------

#[test]
fn malformed_line_is_a_coded_failure() {
    let dir = TempDir::new().expect("temp dir");
    let graph = write_graph(dir.path(), "bad.txt", "0 1\n1 2 3\n");

    cclosure_cmd(dir.path())
        .args(["analyze"])
        .arg(&graph)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001").and(predicate::str::contains("line 2")));
}

#[test]
fn non_utf8_line_is_a_coded_failure() {
    let dir = TempDir::new().expect("temp dir");
    let graph = dir.path().join("binary.txt");
    fs::write(&graph, b"0 1\n\xff\xfe 3\n").expect("write edge list");

    cclosure_cmd(dir.path())
        .args(["analyze"])
        .arg(&graph)
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("E2001")
                .and(predicate::str::contains("line 2"))
                .and(predicate::str::contains("E9001").not()),
        );
}

#[test]
fn missing_file_is_a_coded_failure() {
    let dir = TempDir::new().expect("temp dir");

    let output = cclosure_cmd(dir.path())
        .args(["analyze", "--json", "missing.txt"])
        .output()
        .expect("analyze should not crash");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let error: Value = stderr
        .lines()
        .find_map(|line| serde_json::from_str::<Value>(line).ok())
        .expect("JSON error on stderr");
    assert_eq!(error["error"]["error_code"], "E1002");
    assert_eq!(error["error"]["dataset"], "missing.txt");
}

#[test]
fn one_bad_dataset_does_not_stop_the_others() {
    let dir = TempDir::new().expect("temp dir");
    let good = write_graph(dir.path(), "good.txt", PENDANT_TRIANGLE);

    let output = cclosure_cmd(dir.path())
        .args(["analyze", "--json", "missing.txt"])
        .arg(&good)
        .output()
        .expect("analyze should not crash");
    assert!(!output.status.success());
    let records = json_lines(&output.stdout);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["dataset"], "good.txt");
}

#[test]
fn broken_config_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("cclosure.toml"), "[densify\nmax_rounds = ").expect("write");

    cclosure_cmd(dir.path())
        .args(["analyze", "x.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1001"));
}

// ---------------------------------------------------------------------------
// densify / sweep
// ---------------------------------------------------------------------------

#[test]
fn densify_saturate_closes_the_pendant_triangle() {
    let dir = TempDir::new().expect("temp dir");
    let graph = write_graph(dir.path(), "toy.txt", PENDANT_TRIANGLE);

    let output = cclosure_cmd(dir.path())
        .args(["densify", "--saturate", "--json"])
        .arg(&graph)
        .output()
        .expect("densify should not crash");
    assert!(output.status.success());

    let record = &json_lines(&output.stdout)[0];
    assert_eq!(record["target_c"], 0);
    assert_eq!(record["converged"], true);
    assert_eq!(record["rounds"], serde_json::json!([2]));
    assert_eq!(record["total_added"], 2);
    assert_eq!(record["initial_edges"], 4);
    assert_eq!(record["final_edges"], 6);
    assert_eq!(record["final_closure"], 0);
}

#[test]
fn densify_at_current_closure_adds_nothing() {
    let dir = TempDir::new().expect("temp dir");
    let graph = write_graph(dir.path(), "toy.txt", PENDANT_TRIANGLE);

    let output = cclosure_cmd(dir.path())
        .args(["densify", "-c", "1", "--json"])
        .arg(&graph)
        .output()
        .expect("densify should not crash");
    assert!(output.status.success());

    let record = &json_lines(&output.stdout)[0];
    assert_eq!(record["rounds"], serde_json::json!([]));
    assert_eq!(record["final_edges"], 4);
}

#[test]
fn densify_round_cap_fails_with_code() {
    let dir = TempDir::new().expect("temp dir");
    // Path 0-1-2-3-4 needs more than one round to saturate.
    let graph = write_graph(dir.path(), "path.txt", "0 1\n1 2\n2 3\n3 4\n");

    let output = cclosure_cmd(dir.path())
        .args(["densify", "--saturate", "--max-rounds", "1", "--json"])
        .arg(&graph)
        .output()
        .expect("densify should not crash");
    assert!(!output.status.success());

    let record = &json_lines(&output.stdout)[0];
    assert_eq!(record["converged"], false);
    assert_eq!(record["rounds"].as_array().map(Vec::len), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("E4001"));
}

#[test]
fn sweep_emits_one_record_per_target() {
    let dir = TempDir::new().expect("temp dir");
    let graph = write_graph(dir.path(), "toy.txt", PENDANT_TRIANGLE);

    let output = cclosure_cmd(dir.path())
        .args(["sweep", "--from", "2", "--to", "0", "--json"])
        .arg(&graph)
        .output()
        .expect("sweep should not crash");
    assert!(output.status.success());

    let records = json_lines(&output.stdout);
    let targets: Vec<u64> = records
        .iter()
        .map(|r| r["target_c"].as_u64().expect("target_c"))
        .collect();
    assert_eq!(targets, vec![2, 1, 0]);
    assert_eq!(records[2]["rounds"], serde_json::json!([2]));
    for record in &records {
        assert_eq!(record["initial_edges"], 4);
    }
}

#[test]
fn sweep_round_cap_reports_code_per_target() {
    let dir = TempDir::new().expect("temp dir");
    let graph = write_graph(dir.path(), "path.txt", "0 1\n1 2\n2 3\n3 4\n");

    let output = cclosure_cmd(dir.path())
        .args(["sweep", "--from", "1", "--to", "0", "--max-rounds", "1", "--json"])
        .arg(&graph)
        .output()
        .expect("sweep should not crash");
    assert!(!output.status.success());

    let records = json_lines(&output.stdout);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["target_c"], 1);
    assert_eq!(records[0]["converged"], true);
    assert_eq!(records[1]["target_c"], 0);
    assert_eq!(records[1]["converged"], false);

    let errors: Vec<Value> = String::from_utf8_lossy(&output.stderr)
        .lines()
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["error"]["error_code"], "E4001");
    assert_eq!(errors[0]["error"]["dataset"], "path.txt");
}

#[test]
fn sweep_rejects_inverted_range() {
    let dir = TempDir::new().expect("temp dir");
    let graph = write_graph(dir.path(), "toy.txt", PENDANT_TRIANGLE);

    cclosure_cmd(dir.path())
        .args(["sweep", "--from", "1", "--to", "3"])
        .arg(&graph)
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("sweep range is empty").and(predicate::str::contains("E1003")),
        );
}

// ---------------------------------------------------------------------------
// estimate
// ---------------------------------------------------------------------------

#[test]
fn estimate_json_includes_peel_trace() {
    let dir = TempDir::new().expect("temp dir");
    let graph = write_graph(dir.path(), "toy.txt", PENDANT_TRIANGLE);

    let output = cclosure_cmd(dir.path())
        .args(["estimate", "--json"])
        .arg(&graph)
        .output()
        .expect("estimate should not crash");
    assert!(output.status.success());

    let record = &json_lines(&output.stdout)[0];
    assert_eq!(record["nodes"], 4);
    assert!(record["value"].as_u64().expect("value") <= 1);
    let rounds = record["rounds"].as_array().expect("peel trace");
    assert!(!rounds.is_empty());
}

#[test]
fn estimate_over_node_limit_fails_with_code() {
    let dir = TempDir::new().expect("temp dir");
    let graph = write_graph(dir.path(), "toy.txt", PENDANT_TRIANGLE);

    cclosure_cmd(dir.path())
        .args(["estimate", "--max-nodes", "2"])
        .arg(&graph)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E3002"));
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

#[test]
fn csv_report_appends_without_repeating_header() {
    let dir = TempDir::new().expect("temp dir");
    let graph = write_graph(dir.path(), "toy.txt", PENDANT_TRIANGLE);
    let csv = dir.path().join("closures.csv");

    for _ in 0..2 {
        cclosure_cmd(dir.path())
            .args(["--format", "text", "densify", "--saturate", "--csv"])
            .arg(&csv)
            .arg(&graph)
            .assert()
            .success();
    }

    let content = fs::read_to_string(&csv).expect("read csv");
    let headers = content
        .lines()
        .filter(|line| line.starts_with("dataset,"))
        .count();
    assert_eq!(headers, 1);
    assert!(content.contains("toy.txt,densify,0,"));
}

#[test]
fn analysis_csv_records_stage_times() {
    let dir = TempDir::new().expect("temp dir");
    let graph = write_graph(dir.path(), "toy.txt", PENDANT_TRIANGLE);
    let csv = dir.path().join("closures.csv");

    cclosure_cmd(dir.path())
        .args(["--format", "text", "analyze", "--csv"])
        .arg(&csv)
        .arg(&graph)
        .assert()
        .success();

    let content = fs::read_to_string(&csv).expect("read csv");
    assert!(content.contains("toy.txt,stage,,enumerate,"));
    assert!(content.contains("toy.txt,stage,,summary,"));
    assert!(content.contains("toy.txt,stage,,elapsed_ms,"));
}

#[test]
fn timing_report_goes_to_stderr() {
    let dir = TempDir::new().expect("temp dir");
    let graph = write_graph(dir.path(), "toy.txt", PENDANT_TRIANGLE);

    cclosure_cmd(dir.path())
        .args(["--timing", "--json", "analyze"])
        .arg(&graph)
        .assert()
        .success()
        .stderr(predicate::str::contains("timing report"))
        .stdout(predicate::str::contains("timing report").not());
}
