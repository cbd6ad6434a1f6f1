// Integration tests have relaxed clippy settings.
// Production code (src/) must use strict zero-unwrap/panic patterns.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::too_many_lines,
    clippy::uninlined_format_args,
    clippy::missing_panics_doc
)]
//! End-to-end CLI tests against a temporary database.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

struct Harness {
    dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    fn db(&self) -> PathBuf {
        self.dir.path().join("data").join("registrar.db")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("registrar").expect("binary built");
        cmd.current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("xdg"))
            .env_remove("REGISTRAR_DB")
            .env_remove("REGISTRAR_MAX_CREDITS")
            .env_remove("REGISTRAR_LOG")
            .env_remove("RUST_LOG")
            .arg("--db")
            .arg(self.db());
        cmd
    }

    /// Run and parse the envelope, asserting the exit code.
    fn json(&self, args: &[&str], code: i32) -> Value {
        let output = self.cmd().args(args).assert().code(code).get_output().clone();
        serde_json::from_slice(&output.stdout).expect("stdout is one JSON envelope")
    }

    fn offering(&self, id: &str, name: &str, capacity: &str, credit: &str, slot: [&str; 3]) {
        self.json(
            &[
                "offering", "create", "--id", id, "--name", name, "--capacity", capacity,
                "--credit", credit, "--day", slot[0], "--start", slot[1], "--end", slot[2],
            ],
            0,
        );
    }
}

#[test]
fn register_student_and_show() {
    let h = Harness::new();

    let created = h.json(&["student", "register", "1001"], 0);
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["id"], 1001);

    let shown = h.json(&["student", "show", "1001"], 0);
    assert_eq!(shown["data"]["id"], 1001);

    let duplicate = h.json(&["student", "register", "1001"], 1);
    assert_eq!(duplicate["success"], false);
    assert_eq!(duplicate["error"]["code"], "DUPLICATE_STUDENT");
    assert!(h.db().exists());
}

#[test]
fn invalid_student_id_is_rejected() {
    let h = Harness::new();
    let response = h.json(&["student", "register", "999"], 1);
    assert_eq!(response["error"]["code"], "INVALID_INPUT");
}

#[test]
fn offering_lifecycle() {
    let h = Harness::new();
    h.offering("2002", "Networks", "30", "3", ["TUE", "09:00", "10:30"]);
    h.offering("2001", "Databases", "30", "3", ["mon", "09:00", "10:30"]);

    let listed = h.json(&["offering", "list"], 0);
    let ids: Vec<i64> = listed["data"]
        .as_array()
        .expect("array")
        .iter()
        .map(|o| o["id"].as_i64().expect("id"))
        .collect();
    assert_eq!(ids, vec![2001, 2002]);

    let shown = h.json(&["offering", "show", "2001"], 0);
    assert_eq!(shown["data"]["day"], "MON");
    assert_eq!(shown["data"]["start_time"], "09:00");
    assert_eq!(shown["data"]["current_enrollment"], 0);

    let deleted = h.json(&["offering", "delete", "2001"], 0);
    assert_eq!(deleted["data"]["deleted"], true);

    let missing = h.json(&["offering", "show", "2001"], 1);
    assert_eq!(missing["error"]["code"], "OFFERING_NOT_FOUND");
}

#[test]
fn offering_validation_and_duplicates() {
    let h = Harness::new();
    h.offering("2001", "Databases", "30", "3", ["MON", "09:00", "10:30"]);

    let bad_time = h.json(
        &[
            "offering", "create", "--id", "2002", "--name", "Compilers", "--capacity", "30",
            "--credit", "3", "--day", "MON", "--start", "16:00", "--end", "15:00",
        ],
        1,
    );
    assert_eq!(bad_time["error"]["code"], "INVALID_INPUT");

    let same_name = h.json(
        &[
            "offering", "create", "--id", "2003", "--name", "Databases", "--capacity", "30",
            "--credit", "3", "--day", "TUE", "--start", "09:00", "--end", "10:30",
        ],
        1,
    );
    assert_eq!(same_name["error"]["code"], "DUPLICATE_OFFERING_NAME");
}

#[test]
fn enroll_conflict_and_cancel() {
    let h = Harness::new();
    h.json(&["student", "register", "1001"], 0);
    h.offering("2001", "Databases", "30", "3", ["MON", "09:00", "10:30"]);
    h.offering("2002", "Operating Systems", "30", "3", ["MON", "10:00", "11:30"]);

    let enrolled = h.json(&["enroll", "1001", "2001"], 0);
    assert_eq!(enrolled["data"]["student_id"], 1001);
    assert_eq!(enrolled["data"]["offering_id"], 2001);

    let conflict = h.json(&["enroll", "1001", "2002"], 1);
    assert_eq!(conflict["error"]["code"], "TIME_CONFLICT");
    assert!(conflict["error"]["message"]
        .as_str()
        .expect("message")
        .contains("Databases"));

    let held = h.json(&["enrollments", "1001"], 0);
    assert_eq!(held["data"].as_array().expect("array").len(), 1);

    h.json(&["cancel", "1001", "2001"], 0);
    let again = h.json(&["cancel", "1001", "2001"], 1);
    assert_eq!(again["error"]["code"], "NOT_ENROLLED");

    let shown = h.json(&["offering", "show", "2001"], 0);
    assert_eq!(shown["data"]["current_enrollment"], 0);
}

#[test]
fn missing_entities_are_reported() {
    let h = Harness::new();
    h.offering("2001", "Databases", "30", "3", ["MON", "09:00", "10:30"]);

    let response = h.json(&["enroll", "1001", "2001"], 1);
    assert_eq!(response["error"]["code"], "STUDENT_NOT_FOUND");
}

#[test]
fn reconcile_reports_consistent_count() {
    let h = Harness::new();
    h.json(&["student", "register", "1001"], 0);
    h.offering("2001", "Databases", "30", "3", ["MON", "09:00", "10:30"]);
    h.json(&["enroll", "1001", "2001"], 0);

    let response = h.json(&["reconcile", "2001"], 0);
    assert_eq!(response["data"]["previous"], 1);
    assert_eq!(response["data"]["current"], 1);
}

#[test]
fn batch_fills_to_capacity() {
    let h = Harness::new();
    h.offering("2001", "Seminar", "3", "2", ["WED", "14:00", "15:30"]);
    let ops: Vec<Value> = (1001..1009)
        .map(|id| {
            h.json(&["student", "register", &id.to_string()], 0);
            serde_json::json!({"op": "enroll", "student": id, "offering": 2001})
        })
        .collect();
    let file = h.dir.path().join("batch.json");
    std::fs::write(&file, serde_json::to_string(&ops).expect("serialize")).expect("write");

    let response = h.json(&["batch", file.to_str().expect("utf-8 path")], 1);
    assert_eq!(response["success"], true);
    assert_eq!(response["data"]["total"], 8);
    assert_eq!(response["data"]["succeeded"], 3);
    assert_eq!(response["data"]["failed"], 5);

    let shown = h.json(&["offering", "show", "2001"], 0);
    assert_eq!(shown["data"]["current_enrollment"], 3);
}

#[test]
fn malformed_batch_file_exits_with_usage_code() {
    let h = Harness::new();
    let file = h.dir.path().join("batch.json");
    std::fs::write(&file, "{not json").expect("write");

    let response = h.json(&["batch", file.to_str().expect("utf-8 path")], 2);
    assert_eq!(response["error"]["code"], "INVALID_BATCH");
}

#[test]
fn config_file_lowers_credit_limit() {
    let h = Harness::new();
    let config = h.dir.path().join("strict.toml");
    std::fs::write(&config, "max_credits = 4\n").expect("write");
    let config = config.to_str().expect("utf-8 path").to_string();

    h.json(&["student", "register", "1001"], 0);
    h.offering("2001", "Databases", "30", "3", ["MON", "09:00", "10:30"]);
    h.offering("2002", "Networks", "30", "3", ["TUE", "09:00", "10:30"]);

    h.json(&["--config", &config, "enroll", "1001", "2001"], 0);
    let rejected = h.json(&["--config", &config, "enroll", "1001", "2002"], 1);
    assert_eq!(rejected["error"]["code"], "CREDIT_LIMIT_EXCEEDED");
}

#[test]
fn invalid_config_exits_with_config_code() {
    let h = Harness::new();
    let config = h.dir.path().join("bad.toml");
    std::fs::write(&config, "max_credits = 0\n").expect("write");

    h.cmd()
        .args(["--config", config.to_str().expect("utf-8 path"), "offering", "list"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("CONFIG_ERROR"));
}

#[test]
fn help_lists_commands() {
    let h = Harness::new();
    h.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("enroll").and(predicate::str::contains("batch")));
}

#[test]
fn rust_log_sends_diagnostics_to_stderr() {
    let h = Harness::new();
    h.cmd()
        .env("RUST_LOG", "debug")
        .args(["offering", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"success\": true"))
        .stderr(predicate::str::contains("config loaded"));
}
