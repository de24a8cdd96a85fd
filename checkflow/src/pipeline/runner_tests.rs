//! End-to-end tests for the case runner, using `sh` as the external
//! tool.

use super::{CaseRunner, PipelineProfile, StageSpec};
use crate::cancellation::CancellationToken;
use crate::compare::{CompareRule, ExactText};
use crate::config::RunConfig;
use crate::core::{CaseState, TestCase};
use crate::events::{CollectingEventSink, EventSink};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn golden_rule() -> Arc<dyn CompareRule> {
    Arc::new(ExactText::final_artifact())
}

fn stdout_rule() -> Arc<dyn CompareRule> {
    Arc::new(ExactText::stdout())
}

fn sh_stage(name: &str, script: &str) -> StageSpec {
    StageSpec::new(name, "sh").with_args(["-c", script])
}

/// A case whose input file holds `input_text`, with an optional golden
/// expected file.
fn make_case(dir: &Path, expected: Option<&str>) -> TestCase {
    let input = dir.join("case.src");
    std::fs::write(&input, "source text\n").unwrap();

    let mut case = TestCase::new("case", &input);
    if let Some(text) = expected {
        let path = dir.join("case.out");
        std::fs::write(&path, text).unwrap();
        case = case.with_expected(path);
    }
    case
}

fn spy_log(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("spy.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_artifact_handoff_between_stages() {
    let dir = tempfile::tempdir().unwrap();
    let case = make_case(dir.path(), Some("source text\n"));

    // Stage one copies the input into its artifact; stage two consumes
    // stage one's artifact by reference.
    let profile = PipelineProfile::new("copy-chain", golden_rule())
        .stage(sh_stage("emit", "cat {input} > {artifact}").with_artifact("emitted.txt"))
        .stage(sh_stage("relay", "cat {artifact:emit} > {artifact}").with_artifact("relayed.txt"));
    profile.validate().unwrap();

    let runner = CaseRunner::new(RunConfig::default());
    let outcome = runner.run(&case, &profile, dir.path()).await;

    assert_eq!(outcome.state, CaseState::Pass);
    assert!(outcome.failing_stage.is_none());
}

#[tokio::test]
async fn test_short_circuit_on_nonzero_exit() {
    let dir = tempfile::tempdir().unwrap();
    let case = make_case(dir.path(), Some("unused\n"));

    let profile = PipelineProfile::new("short-circuit", golden_rule())
        .stage(sh_stage("one", "echo one >> {work_dir}/spy.log; exit 1"))
        .stage(sh_stage("two", "echo two >> {work_dir}/spy.log"))
        .stage(sh_stage("three", "echo three >> {work_dir}/spy.log"));

    let runner = CaseRunner::new(RunConfig::default());
    let outcome = runner.run(&case, &profile, dir.path()).await;

    assert_eq!(outcome.state, CaseState::Error);
    assert_eq!(outcome.failing_stage.as_deref(), Some("one"));
    assert_eq!(spy_log(dir.path()), vec!["one".to_string()]);
}

#[tokio::test]
async fn test_launch_error_stops_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let case = make_case(dir.path(), Some("unused\n"));

    let profile = PipelineProfile::new("launch-error", golden_rule())
        .stage(StageSpec::new("one", "/nonexistent/compiler"))
        .stage(sh_stage("two", "echo two >> {work_dir}/spy.log"))
        .stage(sh_stage("three", "echo three >> {work_dir}/spy.log"));

    let runner = CaseRunner::new(RunConfig::default());
    let outcome = runner.run(&case, &profile, dir.path()).await;

    assert_eq!(outcome.state, CaseState::Error);
    assert_eq!(outcome.failing_stage.as_deref(), Some("one"));
    assert!(outcome.diagnostic.unwrap().contains("/nonexistent/compiler"));
    assert!(spy_log(dir.path()).is_empty());
}

#[tokio::test]
async fn test_stage_timeout_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let case = make_case(dir.path(), Some("unused\n"));

    let profile = PipelineProfile::new("timeout", golden_rule()).stage(
        sh_stage("slow", "sleep 10").with_timeout(Duration::from_millis(100)),
    );

    let runner = CaseRunner::new(RunConfig::default());
    let outcome = runner.run(&case, &profile, dir.path()).await;

    assert_eq!(outcome.state, CaseState::Error);
    assert_eq!(outcome.failing_stage.as_deref(), Some("slow"));
    assert!(outcome.diagnostic.unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_missing_declared_artifact_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let case = make_case(dir.path(), Some("unused\n"));

    let profile = PipelineProfile::new("silent-failure", golden_rule())
        .stage(sh_stage("emit", "true").with_artifact("never-written.ll"));

    let runner = CaseRunner::new(RunConfig::default());
    let outcome = runner.run(&case, &profile, dir.path()).await;

    assert_eq!(outcome.state, CaseState::Error);
    assert_eq!(outcome.failing_stage.as_deref(), Some("emit"));
    assert!(outcome
        .diagnostic
        .unwrap()
        .contains("did not produce artifact"));
}

#[tokio::test]
async fn test_case_stdin_reaches_stage() {
    let dir = tempfile::tempdir().unwrap();
    let stdin = dir.path().join("case.in");
    std::fs::write(&stdin, "fed via stdin\n").unwrap();

    let case = make_case(dir.path(), Some("fed via stdin\n")).with_stdin(stdin);

    let profile = PipelineProfile::new("stdin", stdout_rule())
        .stage(sh_stage("echoing", "cat").with_case_stdin());

    let runner = CaseRunner::new(RunConfig::default());
    let outcome = runner.run(&case, &profile, dir.path()).await;

    assert_eq!(outcome.state, CaseState::Pass);
}

#[tokio::test]
async fn test_comparison_mismatch_is_fail_with_line() {
    let dir = tempfile::tempdir().unwrap();
    let case = make_case(dir.path(), Some("a\nc\n"));

    let profile = PipelineProfile::new("mismatch", stdout_rule())
        .stage(sh_stage("emit", "printf 'a\\nb\\n'"));

    let runner = CaseRunner::new(RunConfig::default());
    let outcome = runner.run(&case, &profile, dir.path()).await;

    assert_eq!(outcome.state, CaseState::Fail);
    assert!(outcome.failing_stage.is_none());
    assert!(outcome.diagnostic.unwrap().contains("line 2"));
}

#[tokio::test]
async fn test_missing_expected_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let case = make_case(dir.path(), None);

    let profile =
        PipelineProfile::new("no-golden", stdout_rule()).stage(sh_stage("emit", "echo hi"));

    let runner = CaseRunner::new(RunConfig::default());
    let outcome = runner.run(&case, &profile, dir.path()).await;

    assert_eq!(outcome.state, CaseState::Skipped);
}

#[tokio::test]
async fn test_rerun_yields_same_state() {
    let dir = tempfile::tempdir().unwrap();
    let case = make_case(dir.path(), Some("source text\n"));

    let profile = PipelineProfile::new("idempotent", golden_rule())
        .stage(sh_stage("emit", "cat {input} > {artifact}").with_artifact("out.txt"));

    let runner = CaseRunner::new(RunConfig::default());
    let first = runner.run(&case, &profile, dir.path()).await;
    let second = runner.run(&case, &profile, dir.path()).await;

    assert_eq!(first.state, second.state);
    assert_eq!(first.state, CaseState::Pass);
}

#[tokio::test]
async fn test_cancelled_token_skips_case() {
    let dir = tempfile::tempdir().unwrap();
    let case = make_case(dir.path(), Some("unused\n"));

    let profile = PipelineProfile::new("cancelled", golden_rule())
        .stage(sh_stage("never", "echo never >> {work_dir}/spy.log"));

    let cancel = Arc::new(CancellationToken::new());
    cancel.cancel("test shutdown");

    let runner = CaseRunner::new(RunConfig::default()).with_cancel_token(cancel);
    let outcome = runner.run(&case, &profile, dir.path()).await;

    assert_eq!(outcome.state, CaseState::Skipped);
    assert!(spy_log(dir.path()).is_empty());
}

#[tokio::test]
async fn test_stage_events_emitted_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let case = make_case(dir.path(), Some("source text\n"));

    let profile = PipelineProfile::new("events", golden_rule())
        .stage(sh_stage("emit", "cat {input} > {artifact}").with_artifact("out.txt"));

    let sink = Arc::new(CollectingEventSink::new());
    let runner =
        CaseRunner::new(RunConfig::default()).with_events(sink.clone() as Arc<dyn EventSink>);
    let outcome = runner.run(&case, &profile, dir.path()).await;

    assert_eq!(outcome.state, CaseState::Pass);
    assert_eq!(sink.kinds(), vec!["stage.started", "stage.finished"]);
}
