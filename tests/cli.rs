use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn stackio_run_demo() {
    let mut cmd = Command::cargo_bin("stackio").expect("binary exists");
    cmd.arg("run").arg("demos/hello.sio");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Hello from stackio!"))
        .stdout(predicate::str::contains("8"));
}

#[test]
fn stackio_eval_snippet() {
    let mut cmd = Command::cargo_bin("stackio").expect("binary exists");
    cmd.arg("eval").arg("5 3 add print");
    cmd.assert().success().stdout("8");
}

#[test]
fn stackio_reports_underflow() {
    let mut cmd = Command::cargo_bin("stackio").expect("binary exists");
    cmd.arg("eval").arg("\"partial\" print");
    cmd.assert()
        .failure()
        .stdout("partial")
        .stderr(predicate::str::contains("StackUnderflow"));
}

#[test]
fn stackio_timeout_flag_stops_loops() {
    let mut cmd = Command::cargo_bin("stackio").expect("binary exists");
    cmd.arg("--timeout-ms").arg("50").arg("eval").arg(":spin @spin");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Timeout"));
}

#[test]
fn stackio_tokens_lists_lexemes() {
    let dir = tempdir().expect("create temp dir");
    let script_path = dir.path().join("sample.sio");
    fs::write(&script_path, "# sample\n42 print :end\n").expect("write script");

    let mut cmd = Command::cargo_bin("stackio").expect("binary exists");
    cmd.arg("tokens").arg(&script_path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("number"))
        .stdout(predicate::str::contains("\"42\""))
        .stdout(predicate::str::contains("label"));
}

#[test]
fn stackio_run_missing_file_fails() {
    let dir = tempdir().expect("create temp dir");
    let mut cmd = Command::cargo_bin("stackio").expect("binary exists");
    cmd.arg("run").arg(dir.path().join("absent.sio"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("I/O error"));
}
