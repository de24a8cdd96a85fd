//! Report aggregation and rendering.
//!
//! Outcomes are appended in discovery order and finalized once into an
//! immutable [`Report`]. Run state lives only for the duration of one
//! invocation; persistence happens only through an explicit
//! caller-supplied [`ReportSink`].

mod sink;

pub use sink::{FileReportSink, ReportSink};

use crate::core::{CaseOutcome, CaseState};
use crate::utils::Timestamp;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Counts of cases per terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    /// Number of passing cases.
    pub pass: usize,
    /// Number of failing cases.
    pub fail: usize,
    /// Number of errored cases.
    pub error: usize,
    /// Number of skipped cases.
    pub skipped: usize,
}

impl StateCounts {
    /// Tallies one outcome.
    pub fn record(&mut self, state: CaseState) {
        match state {
            CaseState::Pass => self.pass += 1,
            CaseState::Fail => self.fail += 1,
            CaseState::Error => self.error += 1,
            CaseState::Skipped => self.skipped += 1,
        }
    }

    /// Returns the total number of tallied cases.
    #[must_use]
    pub fn total(&self) -> usize {
        self.pass + self.fail + self.error + self.skipped
    }
}

/// The finalized result of one harness run.
///
/// Outcomes appear in discovery order, every discovered case exactly
/// once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// The run identifier.
    pub run_id: String,
    /// When the run started.
    pub started_at: Timestamp,
    /// When the report was finalized.
    pub finished_at: Timestamp,
    /// Counts per terminal state.
    pub counts: StateCounts,
    /// Per-case outcomes, in discovery order.
    pub outcomes: Vec<CaseOutcome>,
}

impl Report {
    /// Returns the number of reported cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns true if no cases were reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Returns true if every case succeeded under the given skip
    /// policy.
    #[must_use]
    pub fn is_success(&self, skipped_is_success: bool) -> bool {
        self.outcomes
            .iter()
            .all(|o| o.state.is_success(skipped_is_success))
    }

    /// Returns the process exit code the harness should report.
    #[must_use]
    pub fn exit_code(&self, skipped_is_success: bool) -> i32 {
        i32::from(!self.is_success(skipped_is_success))
    }

    /// Renders the machine-parseable form: one JSON record per case,
    /// in discovery order.
    ///
    /// # Errors
    ///
    /// Returns an error if an outcome cannot be serialized.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for outcome in &self.outcomes {
            out.push_str(&serde_json::to_string(outcome)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Renders the human-readable summary: one aligned line per case
    /// followed by counts per state.
    #[must_use]
    pub fn render_summary(&self) -> String {
        let width = self
            .outcomes
            .iter()
            .map(|o| o.case_id.len())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for outcome in &self.outcomes {
            out.push_str(&format!("{:<width$}  {}", outcome.case_id, outcome.state));
            if let Some(stage) = &outcome.failing_stage {
                out.push_str(&format!("  [{stage}]"));
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "\n{} pass, {} fail, {} error, {} skipped ({} total)\n",
            self.counts.pass,
            self.counts.fail,
            self.counts.error,
            self.counts.skipped,
            self.counts.total()
        ));
        out
    }
}

/// Accumulates outcomes for one run and finalizes them into a
/// [`Report`].
#[derive(Debug)]
pub struct ReportBuilder {
    run_id: String,
    started_at: Timestamp,
    outcomes: Vec<CaseOutcome>,
    finalized: Option<Report>,
}

impl ReportBuilder {
    /// Creates a builder for the given run, stamping the start time.
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Utc::now(),
            outcomes: Vec::new(),
            finalized: None,
        }
    }

    /// Appends an outcome in discovery order.
    ///
    /// Recording after finalize discards the cached report; finalize
    /// again to include the new outcome.
    pub fn record(&mut self, outcome: CaseOutcome) {
        self.finalized = None;
        self.outcomes.push(outcome);
    }

    /// Returns the number of recorded outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Finalizes the report, computing counts.
    ///
    /// Idempotent: repeated calls return the same report (including
    /// its finish timestamp) without re-scanning.
    pub fn finalize(&mut self) -> Report {
        if let Some(report) = &self.finalized {
            return report.clone();
        }

        let mut counts = StateCounts::default();
        for outcome in &self.outcomes {
            counts.record(outcome.state);
        }

        let report = Report {
            run_id: self.run_id.clone(),
            started_at: self.started_at,
            finished_at: Utc::now(),
            counts,
            outcomes: self.outcomes.clone(),
        };
        self.finalized = Some(report.clone());
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn outcome(id: &str, state: CaseState) -> CaseOutcome {
        let duration = Duration::from_millis(10);
        match state {
            CaseState::Pass => CaseOutcome::pass(id, duration),
            CaseState::Fail => CaseOutcome::fail(id, "mismatch", duration),
            CaseState::Error => {
                CaseOutcome::error(id, Some("stage".to_string()), "boom", duration)
            }
            CaseState::Skipped => CaseOutcome::skipped(id, "no golden", duration),
        }
    }

    #[test]
    fn test_counts_and_order() {
        let mut builder = ReportBuilder::new("run-1");
        builder.record(outcome("b", CaseState::Pass));
        builder.record(outcome("a", CaseState::Fail));
        builder.record(outcome("c", CaseState::Skipped));

        let report = builder.finalize();

        assert_eq!(report.len(), 3);
        assert_eq!(report.counts.pass, 1);
        assert_eq!(report.counts.fail, 1);
        assert_eq!(report.counts.skipped, 1);
        // Insertion order, not sorted
        let ids: Vec<&str> = report.outcomes.iter().map(|o| o.case_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_finalize_idempotent() {
        let mut builder = ReportBuilder::new("run-1");
        builder.record(outcome("a", CaseState::Pass));

        let first = builder.finalize();
        std::thread::sleep(Duration::from_millis(5));
        let second = builder.finalize();

        assert_eq!(first.finished_at, second.finished_at);
        assert_eq!(first.counts, second.counts);
    }

    #[test]
    fn test_exit_code_policy() {
        let mut builder = ReportBuilder::new("run-1");
        builder.record(outcome("a", CaseState::Pass));
        builder.record(outcome("b", CaseState::Skipped));
        let report = builder.finalize();

        assert_eq!(report.exit_code(true), 0);
        assert_eq!(report.exit_code(false), 1);

        let mut failing = ReportBuilder::new("run-2");
        failing.record(outcome("a", CaseState::Error));
        assert_eq!(failing.finalize().exit_code(true), 1);
    }

    #[test]
    fn test_jsonl_one_record_per_case() {
        let mut builder = ReportBuilder::new("run-1");
        builder.record(outcome("a", CaseState::Pass));
        builder.record(outcome("b", CaseState::Error));

        let jsonl = builder.finalize().to_jsonl().unwrap();
        let lines: Vec<&str> = jsonl.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""case_id":"a""#));
        assert!(lines[1].contains(r#""failing_stage":"stage""#));
    }

    #[test]
    fn test_summary_aligns_identifiers() {
        let mut builder = ReportBuilder::new("run-1");
        builder.record(outcome("short", CaseState::Pass));
        builder.record(outcome("much_longer_name", CaseState::Fail));

        let summary = builder.finalize().render_summary();

        assert!(summary.contains("short             pass"));
        assert!(summary.contains("much_longer_name  fail"));
        assert!(summary.contains("1 pass, 1 fail, 0 error, 0 skipped (2 total)"));
    }

    #[test]
    fn test_record_after_finalize_refreshes() {
        let mut builder = ReportBuilder::new("run-1");
        builder.record(outcome("a", CaseState::Pass));
        let _ = builder.finalize();

        builder.record(outcome("b", CaseState::Pass));
        let report = builder.finalize();
        assert_eq!(report.len(), 2);
    }
}
