use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn fast_run() -> Command {
    let mut cmd = Command::new(cargo_bin!("transfer-sim"));
    cmd.args([
        "--min-delay-ms",
        "0",
        "--max-delay-ms",
        "3",
        "--lock-timeout-ms",
        "200",
    ]);
    cmd
}

#[test]
fn test_cli_end_to_end_csv() {
    let mut cmd = fast_run();
    cmd.args(["--accounts", "4", "--target", "10", "--workers", "3"]);

    let output = cmd.output().expect("Failed to execute command");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    assert_eq!(lines.next(), Some("id,balance"));

    let balances: Vec<i64> = lines
        .map(|line| line.rsplit(',').next().unwrap().parse().unwrap())
        .collect();
    assert_eq!(balances.len(), 4);
    assert_eq!(balances.iter().sum::<i64>(), 40_000);
}

#[test]
fn test_cli_json_report() {
    let mut cmd = fast_run();
    cmd.args([
        "--accounts", "5", "--target", "7", "--workers", "2", "--format", "json",
    ]);

    let output = cmd.output().expect("Failed to execute command");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["successful_transfers"], 7);
    assert_eq!(report["shutdown"]["kind"], "graceful");
    let total: i64 = report["accounts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["balance"].as_i64().unwrap())
        .sum();
    assert_eq!(total, 50_000);
}

#[test]
fn test_cli_logs_to_stderr() {
    let mut cmd = fast_run();
    cmd.env("RUST_LOG", "info")
        .args(["--accounts", "3", "--target", "2", "--workers", "2"]);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Target of transfers reached"))
        .stdout(predicate::str::contains("Target").not());
}

#[test]
fn test_cli_rejects_single_account() {
    let mut cmd = fast_run();
    cmd.args(["--accounts", "1", "--target", "5", "--workers", "2"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("at least 2 accounts are required"));
}

#[test]
fn test_cli_rejects_zero_workers() {
    let mut cmd = fast_run();
    cmd.args(["--accounts", "4", "--target", "5", "--workers", "0"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("worker count must be positive"));
}
