//! Per-stage results collected while a case runs.

use crate::invoker::ToolResult;
use std::path::{Path, PathBuf};

/// The result of one completed stage.
///
/// Stage results are owned by the pipeline runner while the case is in
/// flight and handed to the comparator read-only afterwards.
#[derive(Debug, Clone)]
pub struct StageResult {
    /// The stage name.
    pub stage: String,
    /// The captured tool invocation.
    pub tool: ToolResult,
    /// The declared artifact, if the stage produced one.
    pub artifact: Option<PathBuf>,
}

impl StageResult {
    /// Creates a stage result.
    #[must_use]
    pub fn new(stage: impl Into<String>, tool: ToolResult, artifact: Option<PathBuf>) -> Self {
        Self {
            stage: stage.into(),
            tool,
            artifact,
        }
    }

    /// Returns the artifact path, if any.
    #[must_use]
    pub fn artifact_path(&self) -> Option<&Path> {
        self.artifact.as_deref()
    }
}
