mod common;

use assert_cmd::Command;
use common::{write_zip, PAGE};
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn scormfix_cmd(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("scormfix").unwrap();
    cmd.env_remove("SCORMFIX_DATA_DIR");
    cmd.env_remove("SCORMFIX_SHIM_URL");
    cmd.env_remove("SCORMFIX_CONFIG");
    cmd.arg("--data-dir").arg(data_dir);
    cmd
}

#[test]
fn analyze_prints_report_and_fails_without_manifest() {
    let dir = tempdir().unwrap();
    let zip = write_zip(dir.path(), "plain.zip", &[("index.html", PAGE)]);

    scormfix_cmd(&dir.path().join("data"))
        .arg("analyze")
        .arg(&zip)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"hasManifest\": false"))
        .stdout(predicate::str::contains("No imsmanifest.xml found"));
}

#[test]
fn repair_writes_into_data_dir() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let zip = write_zip(dir.path(), "plain.zip", &[("index.html", PAGE)]);

    scormfix_cmd(&data)
        .arg("repair")
        .arg(&zip)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created missing imsmanifest.xml"));

    assert!(data.join("repaired").join("plain_repaired.zip").exists());
}

#[test]
fn play_then_list_and_destroy_session() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let zip = write_zip(dir.path(), "plain.zip", &[("story.html", PAGE)]);

    let output = scormfix_cmd(&data)
        .arg("play")
        .arg(&zip)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let outcome: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let id = outcome["session"]["sessionId"].as_str().unwrap().to_string();
    assert_eq!(outcome["session"]["launchFile"], "story.html");

    scormfix_cmd(&data)
        .args(["session", "call", &id, "LMSInitialize", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"result\": \"true\""));

    scormfix_cmd(&data)
        .args(["session", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.as_str()));

    scormfix_cmd(&data)
        .args(["session", "destroy", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"removed\": true"));
}

#[test]
fn invalid_session_id_is_an_error() {
    let dir = tempdir().unwrap();

    scormfix_cmd(&dir.path().join("data"))
        .args(["session", "show", "../../etc"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid player session"));
}

#[test]
fn config_init_writes_settings_file() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("scormfix.json");

    scormfix_cmd(&dir.path().join("data"))
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config).unwrap()).unwrap();
    assert_eq!(saved["shim_url"], "/scorm-api-shim.js");
}
