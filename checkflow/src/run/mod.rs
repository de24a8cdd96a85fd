//! Run orchestration.
//!
//! The [`Harness`] ties the components together: discover cases, run
//! them in parallel up to the worker limit (stages within one case
//! stay strictly sequential), and aggregate a report that preserves
//! discovery order regardless of completion order.

mod identity;

pub use identity::RunIdentity;

use crate::cancellation::CancellationToken;
use crate::config::RunConfig;
use crate::core::CaseOutcome;
use crate::discovery::CaseSource;
use crate::errors::HarnessError;
use crate::events::{EventSink, NoOpEventSink, RunEvent};
use crate::pipeline::{CaseRunner, PipelineProfile};
use crate::report::{Report, ReportBuilder};
use crate::utils::sanitize_component;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The batch test harness.
///
/// Failure isolation: no case's failure affects another case's
/// execution or outcome. Only discovery and profile-validation errors
/// abort a run.
pub struct Harness {
    config: RunConfig,
    events: Arc<dyn EventSink>,
    cancel: Arc<CancellationToken>,
}

impl Harness {
    /// Creates a harness with the given configuration.
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

    /// Returns the run-level cancellation token.
    ///
    /// Cancelling it terminates in-flight subprocesses promptly; their
    /// cases are reported Skipped while completed cases keep their
    /// true outcome.
    #[must_use]
    pub fn cancel_token(&self) -> Arc<CancellationToken> {
        self.cancel.clone()
    }

    /// Discovers every case, runs the profile against each, and
    /// returns the finalized report.
    ///
    /// The report enumerates every discovered case exactly once, in
    /// discovery order.
    ///
    /// # Errors
    ///
    /// Returns a [`HarnessError`] for run-fatal conditions only:
    /// discovery failure, profile validation failure, or inability to
    /// create the scratch tree.
    pub async fn run(
        &self,
        source: &dyn CaseSource,
        profile: &PipelineProfile,
    ) -> Result<Report, HarnessError> {
        profile.validate()?;
        let cases = source.discover()?;

        let identity = RunIdentity::new();
        let mut builder = ReportBuilder::new(identity.run_id.to_string());
        let run_root = self.config.scratch_root.join(identity.scratch_dir_name());
        tokio::fs::create_dir_all(&run_root).await?;

        info!(
            run_id = %identity.run_id,
            profile = %profile.name,
            cases = cases.len(),
            scratch = %run_root.display(),
            "run starting"
        );
        self.events
            .emit(&RunEvent::RunStarted {
                run_id: identity.run_id.to_string(),
                cases: cases.len(),
            })
            .await;

        let runner = Arc::new(
            CaseRunner::new(self.config.clone())
                .with_events(self.events.clone())
                .with_cancel_token(self.cancel.clone()),
        );

        let results: Vec<(usize, CaseOutcome)> = stream::iter(cases.iter().enumerate().map(
            |(index, case)| {
                let runner = runner.clone();
                let events = self.events.clone();
                let work_dir = case_work_dir(&run_root, index, &case.id);
                async move {
                    events.try_emit(&RunEvent::CaseStarted {
                        case_id: case.id.clone(),
                    });

                    let outcome = match tokio::fs::create_dir_all(&work_dir).await {
                        Ok(()) => runner.run(case, profile, &work_dir).await,
                        Err(err) => CaseOutcome::error(
                            &case.id,
                            None,
                            format!("cannot create case scratch directory: {err}"),
                            Duration::ZERO,
                        ),
                    };

                    events.try_emit(&RunEvent::CaseFinished {
                        case_id: case.id.clone(),
                        state: outcome.state,
                        duration_ms: u64::try_from(outcome.duration.as_millis())
                            .unwrap_or(u64::MAX),
                    });
                    (index, outcome)
                }
            },
        ))
        .buffer_unordered(self.config.workers)
        .collect()
        .await;

        // Workers complete in arbitrary order; reorder by discovery
        // index before recording.
        let mut slots: Vec<Option<CaseOutcome>> = cases.iter().map(|_| None).collect();
        for (index, outcome) in results {
            slots[index] = Some(outcome);
        }

        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(outcome) => builder.record(outcome),
                // Unreachable as long as every spawned case yields an
                // outcome; recorded explicitly so a case is never
                // silently dropped.
                None => builder.record(CaseOutcome::error(
                    &cases[index].id,
                    None,
                    "case produced no outcome",
                    Duration::ZERO,
                )),
            }
        }

        if let Some(reason) = self.cancel.reason() {
            self.events.emit(&RunEvent::RunCancelled { reason }).await;
        }

        let report = builder.finalize();
        self.events
            .emit(&RunEvent::RunFinished {
                pass: report.counts.pass,
                fail: report.counts.fail,
                error: report.counts.error,
                skipped: report.counts.skipped,
            })
            .await;
        info!(
            run_id = %report.run_id,
            pass = report.counts.pass,
            fail = report.counts.fail,
            error = report.counts.error,
            skipped = report.counts.skipped,
            "run finished"
        );

        Ok(report)
    }
}

/// Scratch directory for one case: index-prefixed so sanitized
/// identifiers can never collide across parallel workers.
fn case_work_dir(run_root: &std::path::Path, index: usize, case_id: &str) -> PathBuf {
    run_root.join(format!("{index:04}-{}", sanitize_component(case_id)))
}
