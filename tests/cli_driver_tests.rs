//! End-to-end driver tests: run the binary on small problems and check the
//! printed summary, the eigenvalue file, and the JSON report.
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

use assert_cmd::Command;
use predicates::prelude::*;

fn eigentrace() -> Command {
    Command::cargo_bin("eigentrace").unwrap()
}

#[test]
fn test_summary_printed_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    eigentrace()
        .args(["-n", "24", "--rho", "0.9"])
        .arg("--output")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode: DSYEVD"))
        .stderr(predicate::str::contains("Eigensolver Pipeline Timing"))
        .stderr(predicate::str::contains("calls="))
        .stderr(predicate::str::contains("dsyevd"))
        .stderr(predicate::str::contains("TOTAL"));
}

#[test]
fn test_eigenvalue_file_has_one_line_per_value() {
    let dir = tempfile::tempdir().unwrap();
    eigentrace()
        .args(["-n", "17"])
        .arg("--output")
        .arg(dir.path())
        .assert()
        .success();

    let contents = std::fs::read_to_string(dir.path().join("eigenvalues.txt")).unwrap();
    let values: Vec<f64> = contents
        .lines()
        .map(|l| l.parse().unwrap())
        .collect();
    assert_eq!(values.len(), 17);
    // Ascending and positive: KMS with |rho| < 1 is positive definite.
    for pair in values.windows(2) {
        assert!(pair[0] <= pair[1]);
    }
    assert!(values[0] > 0.0);
}

#[test]
fn test_vectors_mode_crosses_divide_and_conquer() {
    let dir = tempfile::tempdir().unwrap();
    // n = 40 is past the QL/QR crossover, so the D&C subtree must show up.
    eigentrace()
        .args(["-n", "40", "--vectors"])
        .arg("--output")
        .arg(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("dstedc"))
        .stderr(predicate::str::contains("dlaed4"))
        .stderr(predicate::str::contains("dgemm"));
}

#[test]
fn test_json_report_is_valid_and_totalled() {
    let dir = tempfile::tempdir().unwrap();
    let json_path = dir.path().join("timing.json");
    eigentrace()
        .args(["-n", "20"])
        .arg("--output")
        .arg(dir.path())
        .arg("--report-json")
        .arg(&json_path)
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert!(report["total_calls"].as_u64().unwrap() > 0);
    assert_eq!(report["clock_faults"].as_u64().unwrap(), 0);

    let routines = report["routines"].as_array().unwrap();
    assert!(routines.iter().any(|r| r["name"] == "dsyevd"));
    // Sorted by descending cumulative seconds.
    let seconds: Vec<f64> = routines
        .iter()
        .map(|r| r["seconds"].as_f64().unwrap())
        .collect();
    for pair in seconds.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
}

#[test]
fn test_rejects_rho_outside_unit_interval() {
    eigentrace()
        .args(["-n", "8", "--rho", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--rho"));
}

#[test]
fn test_rejects_zero_size() {
    eigentrace()
        .args(["-n", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--size"));
}

#[test]
fn test_rejects_negative_shift() {
    eigentrace()
        .args(["-n", "8", "--shift=-1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--shift"));
}
