//! Exact-text comparison against a golden expected artifact.

use super::{diff_diagnostic, normalize_newlines, observed_output, Comparison, CompareCtx, CompareRule};
use crate::errors::CompareError;
use async_trait::async_trait;
use std::path::Path;

/// Which text an [`ExactText`] rule judges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    /// The last artifact produced by the pipeline.
    FinalArtifact,
    /// The artifact produced by a named stage.
    Artifact(String),
    /// The final stage's captured stdout.
    Stdout,
}

/// Byte-for-byte equality after line-ending normalization.
///
/// The mismatch diagnostic cites the first differing line number and
/// both fragments. Cases without an expected artifact are Skipped,
/// never Failed.
#[derive(Debug, Clone)]
pub struct ExactText {
    source: TextSource,
    echo_exit_code: bool,
}

impl ExactText {
    /// Judges the last artifact produced by the pipeline.
    #[must_use]
    pub fn final_artifact() -> Self {
        Self {
            source: TextSource::FinalArtifact,
            echo_exit_code: false,
        }
    }

    /// Judges the artifact produced by the named stage.
    #[must_use]
    pub fn artifact(stage: impl Into<String>) -> Self {
        Self {
            source: TextSource::Artifact(stage.into()),
            echo_exit_code: false,
        }
    }

    /// Judges the final stage's captured stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            source: TextSource::Stdout,
            echo_exit_code: false,
        }
    }

    /// Folds the final stage's exit code into the judged text, the way
    /// interpreter-driven golden files record a program's return value
    /// on the last line.
    ///
    /// Only meaningful with [`ExactText::stdout`].
    #[must_use]
    pub fn with_echoed_exit_code(mut self) -> Self {
        self.echo_exit_code = true;
        self
    }

    async fn read_text(path: &Path) -> Result<String, CompareError> {
        let bytes = tokio::fs::read(path).await?;
        Ok(normalize_newlines(&String::from_utf8_lossy(&bytes)))
    }

    async fn actual_text(&self, ctx: &CompareCtx<'_>) -> Result<String, CompareError> {
        match &self.source {
            TextSource::FinalArtifact => {
                let path = ctx.final_artifact().ok_or_else(|| {
                    CompareError::Rule("pipeline produced no artifact to judge".to_string())
                })?;
                Self::read_text(path).await
            }
            TextSource::Artifact(stage) => {
                let path = ctx.artifact(stage).ok_or_else(|| {
                    CompareError::Rule(format!("no artifact recorded for stage '{stage}'"))
                })?;
                Self::read_text(path).await
            }
            TextSource::Stdout => {
                let last = ctx.last_stage().ok_or_else(|| {
                    CompareError::Rule("pipeline ran no stages".to_string())
                })?;
                Ok(observed_output(
                    &last.tool.stdout.text,
                    last.tool.exit,
                    self.echo_exit_code,
                ))
            }
        }
    }
}

#[async_trait]
impl CompareRule for ExactText {
    fn name(&self) -> &str {
        "exact-text"
    }

    async fn compare(&self, ctx: &CompareCtx<'_>) -> Result<Comparison, CompareError> {
        let Some(expected_path) = ctx.case.expected_path() else {
            return Ok(Comparison::Skipped {
                reason: "case records no expected output".to_string(),
            });
        };

        let expected = Self::read_text(expected_path).await?;
        let actual = self.actual_text(ctx).await?;

        Ok(match diff_diagnostic(&expected, &actual) {
            None => Comparison::Pass,
            Some(diagnostic) => Comparison::Fail { diagnostic },
        })
    }
}
