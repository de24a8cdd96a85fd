//! Run observability events.
//!
//! The harness emits a typed event at every run/case/stage boundary.
//! Sinks are pluggable: the default discards events, the logging sink
//! forwards them to `tracing`, and tests collect them in memory.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

use crate::core::CaseState;
use serde::Serialize;

/// An event emitted during a harness run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum RunEvent {
    /// The run started.
    RunStarted {
        /// The run identifier.
        run_id: String,
        /// Number of discovered cases.
        cases: usize,
    },
    /// A case started executing.
    CaseStarted {
        /// The case identifier.
        case_id: String,
    },
    /// A stage started executing.
    StageStarted {
        /// The case identifier.
        case_id: String,
        /// The stage name.
        stage: String,
    },
    /// A stage finished executing.
    StageFinished {
        /// The case identifier.
        case_id: String,
        /// The stage name.
        stage: String,
        /// How the tool exited, rendered as text.
        exit: String,
        /// Stage wall-clock duration in milliseconds.
        duration_ms: u64,
    },
    /// A case reached its terminal state.
    CaseFinished {
        /// The case identifier.
        case_id: String,
        /// The terminal state.
        state: CaseState,
        /// Case wall-clock duration in milliseconds.
        duration_ms: u64,
    },
    /// The run was cancelled.
    RunCancelled {
        /// The cancellation reason.
        reason: String,
    },
    /// The run finished and the report was finalized.
    RunFinished {
        /// Number of passing cases.
        pass: usize,
        /// Number of failing cases.
        fail: usize,
        /// Number of errored cases.
        error: usize,
        /// Number of skipped cases.
        skipped: usize,
    },
}

impl RunEvent {
    /// Returns the dotted event kind (e.g. `"case.finished"`).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RunStarted { .. } => "run.started",
            Self::CaseStarted { .. } => "case.started",
            Self::StageStarted { .. } => "stage.started",
            Self::StageFinished { .. } => "stage.finished",
            Self::CaseFinished { .. } => "case.finished",
            Self::RunCancelled { .. } => "run.cancelled",
            Self::RunFinished { .. } => "run.finished",
        }
    }
}
