//! Re-execution equivalence: judge artifacts by running them.

use super::{diff_diagnostic, observed_output, Comparison, CompareCtx, CompareRule};
use crate::core::ToolExit;
use crate::errors::CompareError;
use crate::invoker::{invoke, InvokeRequest};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Semantic equivalence via re-execution.
///
/// Runs the pipeline's subject artifact and a reference artifact under
/// an executor (an interpreter, emulator, or similar) and compares the
/// observable result: stdout plus exit code. Used when a backend
/// profile cross-validates one target's output against a reference
/// toolchain's artifact rather than a fixed golden file.
///
/// Executor argument strings may reference `{artifact}`, which expands
/// to the artifact under execution.
#[derive(Debug, Clone)]
pub struct ReExecution {
    executor: String,
    args: Vec<String>,
    subject_stage: Option<String>,
    reference_stage: Option<String>,
    echo_exit_code: bool,
    timeout: Option<Duration>,
}

impl ReExecution {
    /// Creates a rule running artifacts as `executor {artifact}`.
    #[must_use]
    pub fn new(executor: impl Into<String>) -> Self {
        Self {
            executor: executor.into(),
            args: vec!["{artifact}".to_string()],
            subject_stage: None,
            reference_stage: None,
            echo_exit_code: true,
            timeout: None,
        }
    }

    /// Replaces the executor argument templates.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Names the stage whose artifact is under judgment.
    ///
    /// Defaults to the last artifact the pipeline produced.
    #[must_use]
    pub fn with_subject_stage(mut self, stage: impl Into<String>) -> Self {
        self.subject_stage = Some(stage.into());
        self
    }

    /// Names the stage whose artifact serves as the reference.
    ///
    /// Without one, the case's expected artifact is executed as a
    /// pre-built reference; cases lacking both are Skipped.
    #[must_use]
    pub fn with_reference_stage(mut self, stage: impl Into<String>) -> Self {
        self.reference_stage = Some(stage.into());
        self
    }

    /// Compares stdout only, ignoring exit codes.
    #[must_use]
    pub fn ignoring_exit_code(mut self) -> Self {
        self.echo_exit_code = false;
        self
    }

    /// Sets the executor timeout (defaults to the run default).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    async fn observe(
        &self,
        artifact: &Path,
        ctx: &CompareCtx<'_>,
    ) -> Result<String, CompareError> {
        let artifact_str = artifact.to_string_lossy();
        let args: Vec<String> = self
            .args
            .iter()
            .map(|template| template.replace("{artifact}", &artifact_str))
            .collect();

        let mut request = InvokeRequest::new(&self.executor, ctx.work_dir)
            .with_args(args)
            .with_timeout(self.timeout.unwrap_or(ctx.config.default_timeout))
            .with_capture_cap(ctx.config.capture_cap);
        if let Some(stdin) = &ctx.case.stdin {
            request = request.with_stdin(stdin);
        }

        let result = invoke(&request, ctx.cancel).await?;
        debug!(artifact = %artifact.display(), exit = %result.exit, "re-executed artifact");

        match result.exit {
            ToolExit::TimedOut => Err(CompareError::ExecutorTimedOut {
                program: self.executor.clone(),
            }),
            ToolExit::Cancelled => Err(CompareError::Cancelled),
            exit => Ok(observed_output(
                &result.stdout.text,
                exit,
                self.echo_exit_code,
            )),
        }
    }
}

#[async_trait]
impl CompareRule for ReExecution {
    fn name(&self) -> &str {
        "re-execution"
    }

    async fn compare(&self, ctx: &CompareCtx<'_>) -> Result<Comparison, CompareError> {
        let subject = match &self.subject_stage {
            Some(stage) => ctx.artifact(stage).ok_or_else(|| {
                CompareError::Rule(format!("no artifact recorded for stage '{stage}'"))
            })?,
            None => ctx.final_artifact().ok_or_else(|| {
                CompareError::Rule("pipeline produced no artifact to judge".to_string())
            })?,
        };

        let reference = match &self.reference_stage {
            Some(stage) => ctx.artifact(stage).ok_or_else(|| {
                CompareError::Rule(format!("no artifact recorded for stage '{stage}'"))
            })?,
            None => match ctx.case.expected_path() {
                Some(path) => path,
                None => {
                    return Ok(Comparison::Skipped {
                        reason: "no reference artifact recorded for case".to_string(),
                    })
                }
            },
        };

        let subject_observed = self.observe(subject, ctx).await?;
        let reference_observed = self.observe(reference, ctx).await?;

        Ok(match diff_diagnostic(&reference_observed, &subject_observed) {
            None => Comparison::Pass,
            Some(diagnostic) => Comparison::Fail {
                diagnostic: format!("observable behavior differs: {diagnostic}"),
            },
        })
    }
}
