//! Case state and tool exit enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The terminal state of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseState {
    /// Every stage exited cleanly and the comparator judged the
    /// outputs equivalent.
    Pass,
    /// Every stage exited cleanly but the comparator found a mismatch.
    Fail,
    /// A stage could not be launched, exited non-zero, timed out, or
    /// failed to produce its declared artifact.
    Error,
    /// The case could not be judged (no expected output available) or
    /// the run was cancelled before the case finished.
    Skipped,
}

impl fmt::Display for CaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
            Self::Error => write!(f, "error"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

impl CaseState {
    /// Returns true if the state counts toward a successful run under
    /// the given skip policy.
    #[must_use]
    pub fn is_success(&self, skipped_is_success: bool) -> bool {
        match self {
            Self::Pass => true,
            Self::Skipped => skipped_is_success,
            Self::Fail | Self::Error => false,
        }
    }

    /// Returns true if the state represents a judged verdict rather
    /// than an execution problem.
    #[must_use]
    pub fn is_verdict(&self) -> bool {
        matches!(self, Self::Pass | Self::Fail)
    }
}

/// How a single tool invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolExit {
    /// The process exited with the given code.
    Code(i32),
    /// The process was terminated by a signal.
    Signaled,
    /// The process exceeded its timeout and was killed.
    TimedOut,
    /// The process was killed because the run was cancelled.
    Cancelled,
}

impl ToolExit {
    /// Returns true if the process exited with code zero.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Code(0))
    }
}

impl fmt::Display for ToolExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "exit code {code}"),
            Self::Signaled => write!(f, "terminated by signal"),
            Self::TimedOut => write!(f, "timed out"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_state_display() {
        assert_eq!(CaseState::Pass.to_string(), "pass");
        assert_eq!(CaseState::Fail.to_string(), "fail");
        assert_eq!(CaseState::Error.to_string(), "error");
        assert_eq!(CaseState::Skipped.to_string(), "skipped");
    }

    #[test]
    fn test_case_state_success_policy() {
        assert!(CaseState::Pass.is_success(false));
        assert!(CaseState::Skipped.is_success(true));
        assert!(!CaseState::Skipped.is_success(false));
        assert!(!CaseState::Fail.is_success(true));
        assert!(!CaseState::Error.is_success(true));
    }

    #[test]
    fn test_case_state_serialize() {
        let json = serde_json::to_string(&CaseState::Skipped).unwrap();
        assert_eq!(json, r#""skipped""#);

        let back: CaseState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CaseState::Skipped);
    }

    #[test]
    fn test_tool_exit_clean() {
        assert!(ToolExit::Code(0).is_clean());
        assert!(!ToolExit::Code(1).is_clean());
        assert!(!ToolExit::TimedOut.is_clean());
        assert!(!ToolExit::Cancelled.is_clean());
    }

    #[test]
    fn test_tool_exit_display() {
        assert_eq!(ToolExit::Code(2).to_string(), "exit code 2");
        assert_eq!(ToolExit::TimedOut.to_string(), "timed out");
    }
}
