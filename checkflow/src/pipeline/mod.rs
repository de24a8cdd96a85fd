//! Pipeline specification and execution.
//!
//! This module provides:
//! - Stage specifications with argument templates
//! - Profile validation (ordering, artifact references)
//! - The per-case runner with short-circuit semantics

mod result;
mod runner;
#[cfg(test)]
mod runner_tests;
mod spec;
mod template;

pub use result::StageResult;
pub use runner::CaseRunner;
pub use spec::{PipelineProfile, StageSpec, StdinSpec};
