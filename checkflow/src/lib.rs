//! # Checkflow
//!
//! A batch test-orchestration engine for external compiler toolchains.
//!
//! Checkflow shepherds existing tools and judges their output: it
//! discovers test cases, runs an ordered pipeline of external tool
//! invocations per case with failure isolation, compares outputs
//! under a pluggable equivalence rule, and aggregates a deterministic
//! report.
//!
//! - **Case discovery**: directory trees or explicit manifests
//! - **Tool invocation**: bounded capture, timeouts, prompt
//!   cancellation of in-flight subprocesses
//! - **Pipelines**: strictly ordered stages with artifact handoff and
//!   short-circuit on failure
//! - **Comparison**: exact-text against goldens, or semantic
//!   equivalence via re-execution under an emulator/interpreter
//! - **Reporting**: discovery-ordered outcomes, counts, JSON Lines and
//!   human-readable forms
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkflow::prelude::*;
//! use std::sync::Arc;
//!
//! let profile = PipelineProfile::new("frontend", Arc::new(ExactText::stdout().with_echoed_exit_code()))
//!     .stage(
//!         StageSpec::new("emit", "compiler")
//!             .with_args(["-s", "{input}", "-emit-llvm", "{artifact}"])
//!             .with_artifact("out.ll"),
//!     )
//!     .stage(
//!         StageSpec::new("interpret", "lli")
//!             .with_args(["{artifact:emit}"])
//!             .with_case_stdin(),
//!     );
//!
//! let harness = Harness::new(RunConfig::default());
//! let report = harness.run(&DirectorySource::new("testcases"), &profile).await?;
//! std::process::exit(report.exit_code(true));
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod compare;
pub mod config;
pub mod core;
pub mod discovery;
pub mod errors;
pub mod events;
pub mod invoker;
pub mod pipeline;
pub mod report;
pub mod run;
pub mod testing;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::compare::{
        CompareCtx, CompareRule, Comparison, ExactText, ReExecution, TextSource,
    };
    pub use crate::config::RunConfig;
    pub use crate::core::{CaseOutcome, CaseState, TestCase, ToolExit};
    pub use crate::discovery::{CaseSource, DirectorySource, ManifestSource};
    pub use crate::errors::{
        CompareError, DiscoveryError, HarnessError, LaunchError, ProfileError,
    };
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink, RunEvent};
    pub use crate::invoker::{CapturedStream, InvokeRequest, ToolResult};
    pub use crate::pipeline::{CaseRunner, PipelineProfile, StageResult, StageSpec, StdinSpec};
    pub use crate::report::{FileReportSink, Report, ReportBuilder, ReportSink, StateCounts};
    pub use crate::run::{Harness, RunIdentity};
}
