// ABOUTME: Integration tests for the dngcm CLI commands.
// ABOUTME: Validates help, init, worklist errors and archive runs against a stub server.

mod support;

use assert_cmd::Command;
use assert_cmd::assert::OutputAssertExt;
use predicates::prelude::*;
use std::fs;
use support::stub_server::StubServer;

fn dngcm_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("dngcm"));
    cmd.env_remove("DNGCM_PASSWORD").env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_shows_commands() {
    dngcm_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("import-type-system"))
        .stdout(predicate::str::contains("deliver-type-system"))
        .stdout(predicate::str::contains("archive-configurations"))
        .stdout(predicate::str::contains("map-configurations"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("dngcm.yml");

    dngcm_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--url", "https://dng.example.org/rm"])
        .assert()
        .success();

    assert!(config_path.exists(), "dngcm.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("url: https://dng.example.org/rm"));
    assert!(content.contains("verdicts:"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("dngcm.yml"), "server: {}").unwrap();

    dngcm_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn missing_config_without_url_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("items.yml"), "- https://h/rm/cm/baseline/_b\n").unwrap();

    dngcm_cmd()
        .current_dir(temp_dir.path())
        .args(["archive-configurations", "--worklist", "items.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn empty_worklist_is_rejected_before_connecting() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("items.yml"), "[]\n").unwrap();

    dngcm_cmd()
        .current_dir(temp_dir.path())
        .args(["--url", "http://127.0.0.1:9/rm"])
        .args(["import-type-system", "--worklist", "items.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("worklist has no items"));
}

#[test]
fn quiet_and_json_conflict() {
    dngcm_cmd()
        .args(["--quiet", "--json", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn unknown_simulation_is_rejected() {
    dngcm_cmd()
        .args(["archive-configurations", "--worklist", "x.yml", "--simulate", "meltdown"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("gate-rejected"));
}

// =============================================================================
// Against a stub server
// =============================================================================

fn login_args(url: &str) -> Vec<String> {
    ["--url", url, "--user", "tester", "--password", "pw"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn single_archive_reports_server_status_verbatim() {
    let stub = StubServer::start(404, "").await;
    let temp_dir = tempfile::tempdir().unwrap();
    let mut cmd = dngcm_cmd();
    cmd.current_dir(temp_dir.path())
        .args(login_args(&stub.url))
        .args([
            "archive-configuration",
            "--configuration",
            "https://clm.example.com/rm/cm/baseline/_b1",
        ]);

    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();

    output
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "archive failed: Unexpected return code '404'.",
        ));
    assert!(
        stub.requests()
            .iter()
            .any(|r| r.starts_with("POST /rm/localVersioning/configurations/archiveWithDescendants?"))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn simulated_gate_rejection_fails_the_batch() {
    let stub = StubServer::start(200, "").await;
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("items.yml"),
        "- https://clm.example.com/rm/cm/baseline/_b1\n",
    )
    .unwrap();
    let mut cmd = dngcm_cmd();
    cmd.current_dir(temp_dir.path())
        .args(login_args(&stub.url))
        .args([
            "archive-configurations",
            "--worklist",
            "items.yml",
            "--simulate",
            "gate-rejected",
            "--skip-archived-check",
        ]);

    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();

    output
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "dependency check failed: Unexpected return code '400'.",
        ))
        .stderr(predicate::str::contains("1 of 1 item(s) failed"));
    assert!(
        !stub
            .requests()
            .iter()
            .any(|r| r.contains("/localVersioning/"))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn json_mode_emits_the_report() {
    let stub = StubServer::start(200, "").await;
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join("items.yml"),
        "- configuration: https://clm.example.com/rm/cm/baseline/_b1\n",
    )
    .unwrap();
    let mut cmd = dngcm_cmd();
    cmd.current_dir(temp_dir.path())
        .arg("--json")
        .args(login_args(&stub.url))
        .args([
            "archive-configurations",
            "--worklist",
            "items.yml",
            "--simulate",
            "archived",
            "--skip-archived-check",
        ]);

    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();

    // The stub answers the gate with an empty body, so the entry fails.
    assert!(!output.status.success());
    let report = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .find(|event| event["event"] == "report")
        .expect("report event");
    assert_eq!(report["data"]["entries"][0]["outcome"], "gate-failed");
    assert_eq!(report["data"]["entries"][0]["message"], "No data returned");
}
