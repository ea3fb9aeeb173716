//! CLI tests for `verifier run`.
//!
//! Spawns the verifier binary inside a temp workspace and checks exit codes,
//! the persisted result record, and the badge block written to the document.

#![cfg(unix)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use verifier::core::badges::{DEFAULT_END_MARKER, DEFAULT_START_MARKER};
use verifier::core::types::{RunRecord, StepStatus};
use verifier::exit_codes;
use verifier::io::results::load_results;
use verifier::test_support::temp_document;

const RESULTS: &str = ".github/readme-verifier/results.json";

fn run_verifier(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_verifier"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("spawn verifier")
}

fn step(meta: &str, code: &str) -> String {
    format!("---\nverify: true\n{meta}\n---\n```bash\n{code}\n```\n\n")
}

fn results(dir: &Path) -> RunRecord {
    load_results(&dir.join(RESULTS)).expect("load results")
}

fn statuses(record: &RunRecord) -> Vec<StepStatus> {
    record.steps.iter().map(|s| s.status).collect()
}

#[test]
fn document_without_steps_completes_with_exit_zero() {
    let (temp, doc) = temp_document("# Demo\n\nNothing to verify here.\n").expect("doc");
    let output = run_verifier(temp.path(), &["run", "README.md"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("no verification steps found"));
    assert!(results(temp.path()).steps.is_empty());

    let updated = fs::read_to_string(&doc).expect("read doc");
    assert!(updated.starts_with(&format!("# Demo\n\n{DEFAULT_START_MARKER}\n")));
    assert!(updated.contains("setup-passing-brightgreen"));
}

#[test]
fn successful_install_step_passes() {
    let contents = format!(
        "# Demo\n\n{}",
        step("step: \"install\"\nrequired: true", "echo installed")
    );
    let (temp, _doc) = temp_document(&contents).expect("doc");
    let output = run_verifier(temp.path(), &["run"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let record = results(temp.path());
    assert_eq!(record.steps.len(), 1);
    assert_eq!(record.steps[0].name, "install");
    assert_eq!(record.steps[0].status, StepStatus::Success);
    assert_eq!(record.steps[0].output, "installed\n");
}

#[test]
fn optional_failure_is_warning_and_next_step_runs() {
    let contents = format!(
        "# Demo\n\n{}{}",
        step("step: lint\nrequired: false", "exit 3"),
        step("step: build", "touch built.txt")
    );
    let (temp, doc) = temp_document(&contents).expect("doc");
    let output = run_verifier(temp.path(), &["run"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(temp.path().join("built.txt").exists());
    let record = results(temp.path());
    assert_eq!(
        statuses(&record),
        vec![StepStatus::Warning, StepStatus::Success]
    );
    let updated = fs::read_to_string(&doc).expect("read doc");
    assert!(updated.contains("setup-partial-yellow"));
    assert!(updated.contains("success%20rate-50%25-yellow"));
}

#[test]
fn required_failure_halts_and_exits_one() {
    let contents = format!(
        "# Demo\n\n{}{}{}",
        step("step: install", "echo ok"),
        step("step: build", "echo broken >&2; exit 1"),
        step("step: test", "touch should-not-exist.txt")
    );
    let (temp, doc) = temp_document(&contents).expect("doc");
    let output = run_verifier(temp.path(), &["run"]);

    assert_eq!(output.status.code(), Some(exit_codes::FAILED));
    assert!(!temp.path().join("should-not-exist.txt").exists());

    let record = results(temp.path());
    assert_eq!(
        statuses(&record),
        vec![StepStatus::Success, StepStatus::Failed]
    );
    assert_eq!(record.steps[1].error, "broken\n");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("VERIFICATION REPORT"));
    assert!(stdout.contains("error: broken"));

    let updated = fs::read_to_string(&doc).expect("read doc");
    assert!(updated.contains("setup-failing-red"));
}

#[test]
fn timeout_on_required_step_fails_run() {
    let contents = format!("# Demo\n\n{}", step("step: slow\ntimeout: 200", "sleep 5"));
    let (temp, _doc) = temp_document(&contents).expect("doc");
    let output = run_verifier(temp.path(), &["run", "--no-update"]);

    assert_eq!(output.status.code(), Some(exit_codes::FAILED));
    let record = results(temp.path());
    assert!(record.steps[0].timed_out);
    assert_eq!(record.steps[0].error, "timed out after 200 ms");
}

#[test]
fn rerun_replaces_badge_block() {
    let contents = format!("# Demo\n\nIntro\n\n{}", step("step: hello", "echo hi"));
    let (temp, doc) = temp_document(&contents).expect("doc");

    for _ in 0..2 {
        let output = run_verifier(temp.path(), &["run"]);
        assert_eq!(output.status.code(), Some(exit_codes::OK));
    }

    let updated = fs::read_to_string(&doc).expect("read doc");
    assert_eq!(updated.matches(DEFAULT_START_MARKER).count(), 1);
    assert_eq!(updated.matches(DEFAULT_END_MARKER).count(), 1);
    assert_eq!(updated.matches("![Setup Status]").count(), 1);
}

#[test]
fn no_update_and_results_override() {
    let contents = format!("# Demo\n\n{}", step("step: hello", "echo hi"));
    let (temp, doc) = temp_document(&contents).expect("doc");
    let output = run_verifier(
        temp.path(),
        &["run", "--no-update", "--results", "out/custom.json"],
    );

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(fs::read_to_string(&doc).expect("read doc"), contents);
    let record = load_results(&temp.path().join("out/custom.json")).expect("load");
    assert_eq!(record.steps.len(), 1);
    assert!(!temp.path().join(RESULTS).exists());
}

#[test]
fn config_file_sets_results_path_and_default_timeout() {
    let contents = format!("# Demo\n\n{}", step("step: slow", "sleep 5"));
    let (temp, _doc) = temp_document(&contents).expect("doc");
    fs::write(
        temp.path().join("verifier.toml"),
        "results_path = \"reports/run.json\"\ndefault_timeout_ms = 200\nupdate_document = false\n",
    )
    .expect("write config");

    let output = run_verifier(temp.path(), &["run", "--config", "verifier.toml"]);

    assert_eq!(output.status.code(), Some(exit_codes::FAILED));
    let record = load_results(&temp.path().join("reports/run.json")).expect("load");
    assert!(record.steps[0].timed_out);
}

#[test]
fn missing_document_exits_one() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = run_verifier(temp.path(), &["run", "MISSING.md"]);

    assert_eq!(output.status.code(), Some(exit_codes::FAILED));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MISSING.md"));
}

#[test]
fn list_prints_steps_without_running_them() {
    let contents = format!(
        "# Demo\n\n{}{}",
        step("step: first\nrequired: false", "touch ran.txt"),
        step("", "echo second")
    );
    let (temp, _doc) = temp_document(&contents).expect("doc");
    let output = run_verifier(temp.path(), &["list"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(!temp.path().join("ran.txt").exists());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1. first language=bash required=false timeout_ms=60000"));
    assert!(stdout.contains("2. step-2 language=bash required=true"));
}
