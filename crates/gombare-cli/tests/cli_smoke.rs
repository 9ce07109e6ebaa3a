use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

const SCHEMA: &str = r#"{"_for": {"people": {"_use": ["last", "first"]}, "rows": {"_use": ["v"]}}}"#;

fn write_tempfile(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().expect("create tempfile");
    write!(file, "{contents}").expect("write tempfile");
    file
}

fn keys_from(stdout: &[u8]) -> Vec<String> {
    let value: Value = serde_json::from_slice(stdout).expect("stdout is JSON");
    value
        .as_array()
        .expect("array output")
        .iter()
        .map(|entry| entry["key"].as_str().expect("string key").to_string())
        .collect()
}

#[test]
fn help_succeeds() {
    let mut cmd = Command::cargo_bin("gombare").expect("binary gombare should be built");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("identity keys"));
}

#[test]
fn single_dash_version_is_normalized() {
    let mut cmd = Command::cargo_bin("gombare").expect("binary gombare should be built");
    cmd.arg("-version").assert().success().stdout(predicate::str::contains("gombare"));
}

#[test]
fn check_prints_resolved_defaults() {
    let mut cmd = Command::cargo_bin("gombare").expect("binary gombare should be built");
    let output = cmd.arg("check").arg("-idparams").arg(SCHEMA).assert().success().get_output().clone();
    let value: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["_for"]["people"]["at"], "people");
    assert_eq!(value["_for"]["rows"]["_use"][0], "v");
}

#[test]
fn keys_of_a_nested_array() {
    let doc = write_tempfile(
        ".json",
        r#"{"people": [{"first": "Ann", "last": "Lee"}, {"first": "Bob", "last": "Ray"}]}"#,
    );
    let mut cmd = Command::cargo_bin("gombare").expect("binary gombare should be built");
    let output = cmd
        .args(["keys", "--idparams", SCHEMA, "--at", "people"])
        .arg(doc.path())
        .assert()
        .success()
        .stderr(predicate::str::is_empty())
        .get_output()
        .clone();
    assert_eq!(keys_from(&output.stdout), ["Lee+Ann", "Ray+Bob"]);
}

#[test]
fn keys_read_schema_and_document_from_yaml_files() {
    let schema = write_tempfile(".yaml", "_for:\n  rows:\n    _use: [v]\n    incr: true\n");
    let doc = write_tempfile(".yaml", "rows:\n  - v: a\n  - v: a\n");
    let mut cmd = Command::cargo_bin("gombare").expect("binary gombare should be built");
    let output = cmd
        .args(["keys", "--yaml", "--at", "rows", "--idparams"])
        .arg(schema.path())
        .arg(doc.path())
        .assert()
        .success()
        .get_output()
        .clone();
    assert_eq!(keys_from(&output.stdout), ["a#1", "a#2"]);
}

#[test]
fn duplicate_keys_fail_unless_fast() {
    let doc = write_tempfile(".json", r#"{"rows": [{"v": 1}, {"v": 1}]}"#);

    let mut strict = Command::cargo_bin("gombare").expect("binary gombare should be built");
    strict
        .args(["keys", "--idparams", SCHEMA, "--at", "rows"])
        .arg(doc.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is not unique"));

    let mut fast = Command::cargo_bin("gombare").expect("binary gombare should be built");
    let output = fast
        .args(["keys", "-fast", "-silent", "--idparams", SCHEMA, "--at", "rows"])
        .arg(doc.path())
        .assert()
        .success()
        .stderr(predicate::str::is_empty())
        .get_output()
        .clone();
    assert_eq!(keys_from(&output.stdout), ["1", "1"]);
}

#[test]
fn empty_keys_abort_the_run() {
    let doc = write_tempfile(".json", r#"{"rows": [{"v": ""}]}"#);
    let mut cmd = Command::cargo_bin("gombare").expect("binary gombare should be built");
    cmd.args(["keys", "--idparams", SCHEMA, "--at", "rows"])
        .arg(doc.path())
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("non-empty ID key"));
}

#[test]
fn unregistered_paths_are_rejected() {
    let doc = write_tempfile(".json", r#"{"other": []}"#);
    let mut cmd = Command::cargo_bin("gombare").expect("binary gombare should be built");
    cmd.args(["keys", "--idparams", SCHEMA, "--at", "other"])
        .arg(doc.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no identification parameter"));
}
