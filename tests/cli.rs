//! End-to-end tests driving the `household` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn household(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("household").unwrap();
    cmd.env("HOUSEHOLD_DATA_DIR", data_dir.path())
        .env_remove("HOUSEHOLD_LOG");
    cmd
}

fn run(data_dir: &TempDir, args: &[&str]) {
    household(data_dir).args(args).assert().success();
}

/// A household with two members, their March incomes and one shared expense
fn seeded() -> TempDir {
    let data_dir = TempDir::new().unwrap();
    run(&data_dir, &["init"]);
    run(&data_dir, &["household", "create", "Home"]);
    run(&data_dir, &["member", "add", "Ana"]);
    run(&data_dir, &["member", "add", "Bo"]);
    run(&data_dir, &["income", "set", "Ana", "3000", "--month", "2025-03"]);
    run(&data_dir, &["income", "set", "Bo", "2000", "--month", "2025-03"]);
    run(
        &data_dir,
        &["expense", "add", "500", "--payer", "Ana", "--date", "2025-03-01", "-m", "rent"],
    );
    data_dir
}

#[test]
fn test_help() {
    let data_dir = TempDir::new().unwrap();
    household(&data_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("settle"));
}

#[test]
fn test_config_shows_data_dir() {
    let data_dir = TempDir::new().unwrap();
    household(&data_dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Active household: (none)"));
}

#[test]
fn test_commands_need_a_household() {
    let data_dir = TempDir::new().unwrap();
    household(&data_dir)
        .args(["member", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No active household"));
}

#[test]
fn test_compute_and_show() {
    let data_dir = seeded();

    household(&data_dir)
        .args(["settle", "compute", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bo pays Ana $200.00"))
        .stdout(predicate::str::contains("Status:         draft"));

    household(&data_dir)
        .args(["settle", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-03"));
}

#[test]
fn test_compute_with_policy_override() {
    let data_dir = seeded();
    run(&data_dir, &["member", "add", "Cy"]);
    run(&data_dir, &["income", "set", "Cy", "0", "--month", "2025-03"]);

    household(&data_dir)
        .args(["settle", "compute", "--month", "2025-03", "--min-share", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("round, min_share 10%"))
        .stdout(predicate::str::contains("Cy pays Ana $50.00"));
}

#[test]
fn test_finalize_locks_the_month() {
    let data_dir = seeded();
    run(&data_dir, &["settle", "compute", "--month", "2025-03"]);

    household(&data_dir)
        .args(["settle", "finalize", "--month", "2025-03", "--as", "Bo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Finalized"));

    household(&data_dir)
        .args(["settle", "compute", "--month", "2025-03"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot recompute settlement"));

    household(&data_dir)
        .args(["settle", "finalize", "--month", "2025-03", "--as", "Ana"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot finalize settlement"));

    household(&data_dir)
        .args(["income", "set", "Ana", "1", "--month", "2025-03"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Period is locked"));

    household(&data_dir)
        .args(["settle", "delete", "--month", "2025-03"])
        .assert()
        .failure();
}

#[test]
fn test_export_csv() {
    let data_dir = seeded();
    run(&data_dir, &["settle", "compute", "--month", "2025-03"]);

    household(&data_dir)
        .args(["settle", "export", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Month,Status,From,To,Amount"))
        .stdout(predicate::str::contains("2025-03,draft,Bo,Ana,200.00"));
}

#[test]
fn test_export_json_to_file() {
    let data_dir = seeded();
    run(&data_dir, &["settle", "compute", "--month", "2025-03"]);
    let out = data_dir.path().join("march.json");

    household(&data_dir)
        .args(["settle", "export", "--month", "2025-03", "--format", "json", "--output"])
        .arg(&out)
        .assert()
        .success();

    let json = std::fs::read_to_string(&out).unwrap();
    let export: household::export::SettlementExport = serde_json::from_str(&json).unwrap();
    export.validate().unwrap();
    assert_eq!(export.settlement.lines.len(), 1);
}

#[test]
fn test_compute_without_income_fails() {
    let data_dir = seeded();
    household(&data_dir)
        .args(["settle", "compute", "--month", "2025-04"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no income records"));
}

#[test]
fn test_history_records_changes() {
    let data_dir = seeded();
    run(&data_dir, &["settle", "compute", "--month", "2025-03"]);

    household(&data_dir)
        .args(["history", "--limit", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE Settlement"));
}

#[test]
fn test_expense_list_and_remove() {
    let data_dir = seeded();

    let output = household(&data_dir)
        .args(["expense", "list", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rent"))
        .get_output()
        .stdout
        .clone();
    let listing = String::from_utf8(output).unwrap();
    let id = listing
        .lines()
        .find(|l| l.contains("rent"))
        .and_then(|l| l.split_whitespace().next())
        .unwrap()
        .to_string();

    run(&data_dir, &["expense", "remove", &id, "--month", "2025-03"]);

    household(&data_dir)
        .args(["expense", "list", "--month", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No expenses recorded"));
}
