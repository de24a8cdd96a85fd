//! Output comparison.
//!
//! A profile judges its surviving outputs through a pluggable
//! [`CompareRule`]. Two rules ship with the harness:
//!
//! - [`ExactText`]: byte equality after line-ending normalization,
//!   against a golden expected artifact.
//! - [`ReExecution`]: semantic equivalence, running the produced artifact
//!   and a reference artifact under an executor and comparing observable
//!   behavior (stdout plus exit code).

mod exact;
mod execution;

pub use exact::{ExactText, TextSource};
pub use execution::ReExecution;

use crate::cancellation::CancellationToken;
use crate::config::RunConfig;
use crate::core::{TestCase, ToolExit};
use crate::errors::CompareError;
use crate::pipeline::StageResult;
use async_trait::async_trait;
use std::fmt::Debug;
use std::path::Path;

/// The verdict of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// Outputs are equivalent.
    Pass,
    /// Outputs differ.
    Fail {
        /// What differed, citing the first differing line.
        diagnostic: String,
    },
    /// The rule requires an expected artifact the case does not have.
    ///
    /// Distinguishes "cannot judge" from "judged wrong".
    Skipped {
        /// Why the case could not be judged.
        reason: String,
    },
}

/// Read-only view of a finished case handed to a comparison rule.
#[derive(Debug)]
pub struct CompareCtx<'a> {
    /// The case under judgment.
    pub case: &'a TestCase,
    /// The case scratch directory.
    pub work_dir: &'a Path,
    /// Results of every stage, all of which exited cleanly.
    pub stages: &'a [StageResult],
    /// The run configuration (capture cap, default timeout).
    pub config: &'a RunConfig,
    /// The run-level cancellation token.
    pub cancel: &'a CancellationToken,
}

impl CompareCtx<'_> {
    /// Returns the artifact recorded by the named stage.
    #[must_use]
    pub fn artifact(&self, stage: &str) -> Option<&Path> {
        self.stages
            .iter()
            .find(|r| r.stage == stage)
            .and_then(StageResult::artifact_path)
    }

    /// Returns the last artifact produced by the pipeline.
    #[must_use]
    pub fn final_artifact(&self) -> Option<&Path> {
        self.stages
            .iter()
            .rev()
            .find_map(StageResult::artifact_path)
    }

    /// Returns the final stage's result.
    #[must_use]
    pub fn last_stage(&self) -> Option<&StageResult> {
        self.stages.last()
    }
}

/// A pluggable equivalence rule.
///
/// Rules are selected per profile; adding a rule never touches the
/// pipeline runner.
#[async_trait]
pub trait CompareRule: Send + Sync + Debug {
    /// Returns the rule name (used in diagnostics).
    fn name(&self) -> &str;

    /// Judges the case's outputs.
    ///
    /// # Errors
    ///
    /// Returns a [`CompareError`] for infrastructure problems (an
    /// executor that cannot run, unreadable artifacts), never for a
    /// legitimate mismatch, which is a [`Comparison::Fail`].
    async fn compare(&self, ctx: &CompareCtx<'_>) -> Result<Comparison, CompareError>;
}

/// Normalizes line endings so golden files recorded on any platform
/// compare equal.
#[must_use]
pub(crate) fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Renders the observable behavior of a finished process: stdout with
/// the exit code folded in on its own final line.
#[must_use]
pub(crate) fn observed_output(stdout: &str, exit: ToolExit, echo_exit_code: bool) -> String {
    let mut text = normalize_newlines(stdout);
    if echo_exit_code {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        match exit {
            ToolExit::Code(code) => text.push_str(&format!("{code}\n")),
            _ => text.push_str("signal\n"),
        }
    }
    text
}

/// Builds a first-difference diagnostic between two normalized texts,
/// or `None` when they are equal.
#[must_use]
pub(crate) fn diff_diagnostic(expected: &str, actual: &str) -> Option<String> {
    if expected == actual {
        return None;
    }

    let expected_lines: Vec<&str> = expected.split('\n').collect();
    let actual_lines: Vec<&str> = actual.split('\n').collect();

    for (index, (want, got)) in expected_lines.iter().zip(actual_lines.iter()).enumerate() {
        if want != got {
            return Some(format!(
                "line {}: expected `{want}`, actual `{got}`",
                index + 1
            ));
        }
    }

    // One side is a strict prefix of the other.
    let line = expected_lines.len().min(actual_lines.len());
    if expected_lines.len() < actual_lines.len() {
        Some(format!(
            "line {}: expected output ends, actual continues with `{}`",
            line + 1,
            actual_lines[line]
        ))
    } else {
        Some(format!(
            "line {}: actual output ends, expected continues with `{}`",
            line + 1,
            expected_lines[line]
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_texts_no_diagnostic() {
        assert!(diff_diagnostic("a\nb\n", "a\nb\n").is_none());
    }

    #[test]
    fn test_diagnostic_cites_first_differing_line() {
        let diag = diff_diagnostic("a\nc\n", "a\nb\n").unwrap();
        assert!(diag.starts_with("line 2:"));
        assert!(diag.contains('`'));
    }

    #[test]
    fn test_diagnostic_on_missing_tail() {
        let diag = diff_diagnostic("a\nb\nc", "a\nb").unwrap();
        assert!(diag.contains("actual output ends"));
        assert!(diag.contains("`c`"));
    }

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("a\r\nb\r\n"), "a\nb\n");
    }

    #[test]
    fn test_observed_output_appends_exit_code() {
        let text = observed_output("7\n", ToolExit::Code(0), true);
        assert_eq!(text, "7\n0\n");
    }

    #[test]
    fn test_observed_output_empty_stdout() {
        let text = observed_output("", ToolExit::Code(42), true);
        assert_eq!(text, "42\n");
    }

    #[test]
    fn test_observed_output_without_echo() {
        let text = observed_output("7\n", ToolExit::Code(3), false);
        assert_eq!(text, "7\n");
    }
}
