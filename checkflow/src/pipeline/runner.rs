//! The per-case pipeline runner.
//!
//! Executes a profile's stages strictly in declared order,
//! short-circuiting on the first failure, then hands the surviving
//! results to the profile's comparison rule. Every case-level
//! condition is converted into a [`CaseOutcome`] here; nothing
//! case-scoped escapes to abort the run.

use super::spec::{PipelineProfile, StageSpec, StdinSpec};
use super::template::{self, TemplateContext};
use super::StageResult;
use crate::cancellation::CancellationToken;
use crate::compare::{CompareCtx, Comparison};
use crate::config::RunConfig;
use crate::core::{CaseOutcome, TestCase, ToolExit};
use crate::errors::CompareError;
use crate::events::{EventSink, NoOpEventSink, RunEvent};
use crate::invoker::{invoke, InvokeRequest, ToolResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

const CANCELLED_REASON: &str = "run cancelled";

/// Runs one case at a time against a profile.
pub struct CaseRunner {
    config: RunConfig,
    events: Arc<dyn EventSink>,
    cancel: Arc<CancellationToken>,
}

impl CaseRunner {
    /// Creates a runner with no event sink and a private token.
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            events: Arc::new(NoOpEventSink),
            cancel: Arc::new(CancellationToken::new()),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Shares a run-level cancellation token.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: Arc<CancellationToken>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the cancellation token.
    #[must_use]
    pub fn cancel_token(&self) -> &Arc<CancellationToken> {
        &self.cancel
    }

    /// Runs every stage of the profile for one case and judges the
    /// result.
    ///
    /// `work_dir` must be a directory private to this case; declared
    /// artifacts are resolved against it.
    pub async fn run(
        &self,
        case: &TestCase,
        profile: &PipelineProfile,
        work_dir: &Path,
    ) -> CaseOutcome {
        let started = Instant::now();
        let mut results: Vec<StageResult> = Vec::with_capacity(profile.stages.len());
        let mut artifacts: HashMap<String, PathBuf> = HashMap::new();

        for stage in &profile.stages {
            if self.cancel.is_cancelled() {
                return CaseOutcome::skipped(&case.id, CANCELLED_REASON, started.elapsed());
            }

            let outcome = self
                .run_stage(case, stage, work_dir, &mut artifacts, started)
                .await;
            match outcome {
                Ok(result) => results.push(result),
                Err(terminal) => return terminal,
            }
        }

        let ctx = CompareCtx {
            case,
            work_dir,
            stages: &results,
            config: &self.config,
            cancel: &self.cancel,
        };

        match profile.rule.compare(&ctx).await {
            Ok(Comparison::Pass) => CaseOutcome::pass(&case.id, started.elapsed()),
            Ok(Comparison::Fail { diagnostic }) => {
                CaseOutcome::fail(&case.id, diagnostic, started.elapsed())
            }
            Ok(Comparison::Skipped { reason }) => {
                CaseOutcome::skipped(&case.id, reason, started.elapsed())
            }
            Err(CompareError::Cancelled) => {
                CaseOutcome::skipped(&case.id, CANCELLED_REASON, started.elapsed())
            }
            Err(err) => CaseOutcome::error(
                &case.id,
                None,
                format!("{} comparison failed: {err}", profile.rule.name()),
                started.elapsed(),
            ),
        }
    }

    /// Runs one stage; `Err` carries the terminal outcome that stops
    /// the pipeline.
    async fn run_stage(
        &self,
        case: &TestCase,
        stage: &StageSpec,
        work_dir: &Path,
        artifacts: &mut HashMap<String, PathBuf>,
        started: Instant,
    ) -> Result<StageResult, CaseOutcome> {
        let current_artifact = stage.artifact.as_ref().map(|name| work_dir.join(name));
        let tctx = TemplateContext {
            case,
            work_dir,
            artifacts,
            current_artifact: current_artifact.as_deref(),
        };

        let args: Result<Vec<String>, _> = stage
            .args
            .iter()
            .map(|t| template::expand(t, &tctx))
            .collect();
        let args = match args {
            Ok(args) => args,
            Err(err) => {
                return Err(CaseOutcome::error(
                    &case.id,
                    Some(stage.name.clone()),
                    format!("cannot prepare stage arguments: {err}"),
                    started.elapsed(),
                ))
            }
        };

        let stdin = match &stage.stdin {
            StdinSpec::Null => None,
            StdinSpec::Case => case.stdin.clone(),
            StdinSpec::Path(template) => match template::expand(template, &tctx) {
                Ok(path) => Some(PathBuf::from(path)),
                Err(err) => {
                    return Err(CaseOutcome::error(
                        &case.id,
                        Some(stage.name.clone()),
                        format!("cannot prepare stage stdin: {err}"),
                        started.elapsed(),
                    ))
                }
            },
        };

        self.events.try_emit(&RunEvent::StageStarted {
            case_id: case.id.clone(),
            stage: stage.name.clone(),
        });

        let mut request = InvokeRequest::new(&stage.program, work_dir)
            .with_args(args)
            .with_timeout(stage.timeout.unwrap_or(self.config.default_timeout))
            .with_capture_cap(self.config.capture_cap);
        if let Some(stdin) = stdin {
            request = request.with_stdin(stdin);
        }

        let tool = match invoke(&request, &self.cancel).await {
            Ok(tool) => tool,
            Err(launch) => {
                return Err(CaseOutcome::error(
                    &case.id,
                    Some(stage.name.clone()),
                    launch.to_string(),
                    started.elapsed(),
                ))
            }
        };

        self.events.try_emit(&RunEvent::StageFinished {
            case_id: case.id.clone(),
            stage: stage.name.clone(),
            exit: tool.exit.to_string(),
            duration_ms: u64::try_from(tool.duration.as_millis()).unwrap_or(u64::MAX),
        });
        debug!(case = %case.id, stage = %stage.name, exit = %tool.exit, "stage finished");

        match tool.exit {
            ToolExit::Cancelled => {
                return Err(CaseOutcome::skipped(
                    &case.id,
                    CANCELLED_REASON,
                    started.elapsed(),
                ))
            }
            ToolExit::TimedOut => {
                return Err(CaseOutcome::error(
                    &case.id,
                    Some(stage.name.clone()),
                    format!("timed out after {:.1}s", request.timeout.as_secs_f64()),
                    started.elapsed(),
                ))
            }
            ToolExit::Code(0) => {}
            exit => {
                return Err(CaseOutcome::error(
                    &case.id,
                    Some(stage.name.clone()),
                    failure_diagnostic(exit, &tool),
                    started.elapsed(),
                ))
            }
        }

        let artifact = match current_artifact {
            Some(path) => {
                let produced = tokio::fs::try_exists(&path).await.unwrap_or(false);
                if !produced {
                    return Err(CaseOutcome::error(
                        &case.id,
                        Some(stage.name.clone()),
                        format!(
                            "stage exited cleanly but did not produce artifact '{}'",
                            path.display()
                        ),
                        started.elapsed(),
                    ));
                }
                artifacts.insert(stage.name.clone(), path.clone());
                Some(path)
            }
            None => None,
        };

        Ok(StageResult::new(&stage.name, tool, artifact))
    }
}

/// Builds a diagnostic for a tool-reported failure, including a
/// stderr excerpt when one was captured.
fn failure_diagnostic(exit: ToolExit, tool: &ToolResult) -> String {
    let stderr_tail = tool.stderr.tail(5);
    if stderr_tail.is_empty() {
        exit.to_string()
    } else {
        format!("{exit}; stderr: {stderr_tail}")
    }
}
