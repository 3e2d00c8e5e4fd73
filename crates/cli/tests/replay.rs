// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

mod common;
use common::*;

use std::fs;

const CAPTURE: &str = concat!(
    "{\"type\":\"student_checked_in\",\"payload\":{\"scheduleId\":42,\"studentId\":\"u1\",\"studentName\":\"Ada\"}}\n",
    "{\"type\":\"manual_override\",\"payload\":{\"scheduleId\":42,\"studentId\":\"u2\",\"status\":\"excused\",\"overrideBy\":\"t9\"}}\n",
    "garbage\n",
    "{\"type\":\"bulk_update\",\"payload\":{\"scheduleId\":42,\"updates\":[{\"studentId\":\"u3\",\"status\":\"late\"},{\"status\":\"late\"}]}}\n",
);

fn capture() -> (TempDir, std::path::PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("capture.jsonl");
    fs::write(&path, CAPTURE).unwrap();
    (temp, path)
}

#[test]
fn replay_prints_stats_and_records() {
    let (_temp, path) = capture();

    rollcall()
        .arg("replay")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "42: 3 total, 1 present, 1 late, 0 absent, 1 excused, 1 checked in",
        ))
        .stdout(predicate::str::contains("Ada"))
        .stdout(predicate::str::contains("[override]"))
        .stdout(predicate::str::contains(
            "replayed 4 messages: 3 applied, 1 undecodable",
        ));
}

#[test]
fn replay_json_output() {
    let (_temp, path) = capture();

    let output = rollcall()
        .arg("replay")
        .arg(&path)
        .args(["--output", "json", "--schedule", "42"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["applied"], 3);
    assert_eq!(json["schedules"][0]["scheduleId"], "42");
    assert_eq!(json["schedules"][0]["stats"]["total"], 3);
    assert_eq!(json["errors"][0]["kind"], "decode");
}

#[test]
fn replay_missing_file_fails() {
    let temp = TempDir::new().unwrap();

    rollcall()
        .arg("replay")
        .arg(temp.path().join("nope.jsonl"))
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: io error"));
}

#[test]
fn watch_without_token_fails_fast() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    fs::write(&config, "").unwrap();

    rollcall()
        .args(["watch", "--schedule", "42", "--config"])
        .arg(&config)
        .env_remove("ROLLCALL_TOKEN")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no credential given"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn config_prints_defaults() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    fs::write(&config, "[reconnect]\nmax_attempts = 8\n").unwrap();

    rollcall()
        .args(["config", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("max_attempts = 8"))
        .stdout(predicate::str::contains("base_delay_ms = 3000"));
}
