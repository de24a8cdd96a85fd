//! The per-case outcome appended to the report.

use super::CaseState;
use crate::utils::duration_millis;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The terminal result of running one test case.
///
/// A `CaseOutcome` is created once per case and never mutated after
/// creation. The failing-stage pointer, when set, names a stage that
/// actually ran and failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseOutcome {
    /// The identifier of the case.
    pub case_id: String,

    /// The terminal state of the case.
    pub state: CaseState,

    /// The stage whose failure terminated the pipeline, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failing_stage: Option<String>,

    /// Human-readable diagnostic (mismatch details, captured stderr,
    /// skip reason).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,

    /// Wall-clock duration of the whole case pipeline.
    #[serde(with = "duration_millis", rename = "duration_ms")]
    pub duration: Duration,
}

impl CaseOutcome {
    /// Creates a passing outcome.
    #[must_use]
    pub fn pass(case_id: impl Into<String>, duration: Duration) -> Self {
        Self {
            case_id: case_id.into(),
            state: CaseState::Pass,
            failing_stage: None,
            diagnostic: None,
            duration,
        }
    }

    /// Creates a failing outcome with a comparison diagnostic.
    #[must_use]
    pub fn fail(
        case_id: impl Into<String>,
        diagnostic: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            state: CaseState::Fail,
            failing_stage: None,
            diagnostic: Some(diagnostic.into()),
            duration,
        }
    }

    /// Creates an error outcome attributed to a stage.
    #[must_use]
    pub fn error(
        case_id: impl Into<String>,
        failing_stage: Option<String>,
        diagnostic: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            state: CaseState::Error,
            failing_stage,
            diagnostic: Some(diagnostic.into()),
            duration,
        }
    }

    /// Creates a skipped outcome with a reason.
    #[must_use]
    pub fn skipped(
        case_id: impl Into<String>,
        reason: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            state: CaseState::Skipped,
            failing_stage: None,
            diagnostic: Some(reason.into()),
            duration,
        }
    }

    /// Returns true if the case passed.
    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.state == CaseState::Pass
    }
}
