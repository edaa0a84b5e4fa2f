// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn failed(exit_code: Option<i32>, stdout: &str, stderr: &str) -> CommandError {
    CommandError::Failed {
        argv: vec!["git".into(), "push".into()],
        exit_code,
        stdout: stdout.into(),
        stderr: stderr.into(),
    }
}

#[yare::parameterized(
    prefers_stderr   = { Some(1), "out", "err", "Command git push failed with exit code 1: err" },
    falls_to_stdout  = { Some(128), "out", "", "Command git push failed with exit code 128: out" },
    killed           = { None, "", "", "Command git push failed with exit code none (terminated by signal): " },
)]
fn failed_message(exit_code: Option<i32>, stdout: &str, stderr: &str, expected: &str) {
    assert_eq!(failed(exit_code, stdout, stderr).to_string(), expected);
}

#[test]
fn check_passes_success_through() {
    let output = CommandOutput {
        argv: vec!["true".into()],
        exit_code: Some(0),
        ..CommandOutput::default()
    };
    assert_eq!(output.clone().check().unwrap(), output);
}

#[test]
fn check_converts_failure() {
    let output = CommandOutput {
        argv: vec!["false".into()],
        exit_code: Some(1),
        stdout: String::new(),
        stderr: "bad".into(),
    };
    let err = output.check().unwrap_err();
    assert!(matches!(err, CommandError::Failed { exit_code: Some(1), .. }));
}

#[test]
fn request_builder_sets_fields() {
    let request = CommandRequest::new(["ls", "-la"])
        .cwd("/tmp")
        .timeout(Duration::from_secs(2));
    assert_eq!(request.argv, vec!["ls", "-la"]);
    assert_eq!(request.cwd, Some(PathBuf::from("/tmp")));
    assert_eq!(request.timeout, Some(Duration::from_secs(2)));
    assert!(request.env.is_none());
}

#[tokio::test]
async fn process_runner_respects_cwd() {
    let dir = tempfile::tempdir().unwrap();
    let request = CommandRequest::new(["pwd"]).cwd(dir.path());
    let output = ProcessRunner::new().run(&request).await.unwrap();
    let reported = std::path::Path::new(output.stdout.trim()).canonicalize().unwrap();
    assert_eq!(reported, dir.path().canonicalize().unwrap());
}

#[tokio::test]
async fn process_runner_reports_nonzero_exit_without_error() {
    let request = CommandRequest::new(["sh", "-c", "printf partial; exit 4"]);
    let output = ProcessRunner::new().run(&request).await.unwrap();
    assert_eq!(output.exit_code, Some(4));
    assert_eq!(output.stdout, "partial");
    assert!(!output.success());
}

#[tokio::test]
async fn process_runner_rejects_empty_argv() {
    let err = ProcessRunner::new()
        .run(&CommandRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CommandError::EmptyCommand));
}

#[tokio::test]
async fn fake_runner_records_and_defaults_to_success() {
    let fake = FakeCommandRunner::new();
    let output = fake.run(&CommandRequest::new(["anything"])).await.unwrap();
    assert!(output.success());
    assert_eq!(fake.calls(), vec![CommandRequest::new(["anything"])]);
}
