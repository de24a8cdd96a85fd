//! Error types for the checkflow harness.
//!
//! The taxonomy separates run-fatal conditions (discovery and profile
//! configuration) from case-level conditions. Case-level conditions
//! (launch failures, non-zero exits, timeouts, comparison mismatches)
//! never surface as errors here; the pipeline runner converts them
//! into a [`crate::core::CaseOutcome`].

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for harness runs.
///
/// Only conditions fatal to the whole run appear here; everything
/// case-scoped is reported through the per-case outcome instead.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The case source was malformed or unreadable.
    #[error("{0}")]
    Discovery(#[from] DiscoveryError),

    /// The pipeline profile failed validation.
    #[error("{0}")]
    Profile(#[from] ProfileError),

    /// A run-level filesystem operation failed (e.g. creating the
    /// scratch root).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised when the case source cannot be enumerated.
///
/// Discovery errors are fatal: they abort the run before any case
/// executes.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The case source root could not be read.
    #[error("case source '{path}' is unreadable: {source}")]
    Unreadable {
        /// The offending path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A file referenced by the case source does not exist.
    #[error("case '{case_id}' references missing file '{path}'")]
    MissingFile {
        /// The case whose reference is broken.
        case_id: String,
        /// The missing path.
        path: PathBuf,
    },

    /// The manifest document could not be parsed.
    #[error("manifest '{path}' is malformed: {message}")]
    MalformedManifest {
        /// The manifest path.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// Two cases share the same identifier.
    #[error("duplicate case identifier '{case_id}'")]
    DuplicateCase {
        /// The duplicated identifier.
        case_id: String,
    },
}

/// Error raised when a pipeline profile fails validation.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The profile name is empty or whitespace-only.
    #[error("profile name cannot be empty")]
    EmptyName,

    /// The profile declares no stages.
    #[error("profile '{profile}' declares no stages")]
    NoStages {
        /// The profile name.
        profile: String,
    },

    /// Two stages share the same name.
    #[error("profile '{profile}' declares stage '{stage}' more than once")]
    DuplicateStage {
        /// The profile name.
        profile: String,
        /// The duplicated stage name.
        stage: String,
    },

    /// A template references a placeholder the harness does not know.
    #[error("stage '{stage}' references unknown placeholder '{{{placeholder}}}'")]
    UnknownPlaceholder {
        /// The stage whose template is broken.
        stage: String,
        /// The unknown placeholder name.
        placeholder: String,
    },

    /// A template references the artifact of a stage that does not run
    /// earlier in the pipeline.
    #[error("stage '{stage}' references artifact of '{reference}', which is not an earlier stage with a declared artifact")]
    ForwardArtifactReference {
        /// The referencing stage.
        stage: String,
        /// The referenced stage name.
        reference: String,
    },

    /// A stage references its own artifact without declaring one.
    #[error("stage '{stage}' references {{artifact}} but declares no artifact")]
    UndeclaredArtifact {
        /// The offending stage.
        stage: String,
    },
}

/// Error raised when an external tool cannot be launched at all.
///
/// Distinct from a tool-reported failure: a spawned process that exits
/// non-zero is encoded in the stage result, not raised.
#[derive(Debug, Error)]
#[error("failed to launch '{program}': {source}")]
pub struct LaunchError {
    /// The program that could not be started.
    pub program: String,
    /// The underlying IO error.
    #[source]
    pub source: std::io::Error,
}

impl LaunchError {
    /// Creates a new launch error.
    #[must_use]
    pub fn new(program: impl Into<String>, source: std::io::Error) -> Self {
        Self {
            program: program.into(),
            source,
        }
    }
}

/// Error raised while expanding an argument template at run time.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The template names a placeholder the harness does not know.
    #[error("unknown placeholder '{{{name}}}'")]
    UnknownPlaceholder {
        /// The placeholder name.
        name: String,
    },

    /// The template references a stage with no recorded artifact.
    #[error("no artifact recorded for stage '{stage}'")]
    UnknownStage {
        /// The referenced stage name.
        stage: String,
    },

    /// The template references the case stdin but the case has none.
    #[error("stage requires a stdin file but the case provides none")]
    NoStdin,
}

/// Error raised inside a comparison rule.
///
/// The pipeline runner maps these onto case outcomes: cancellation
/// becomes Skipped, everything else becomes Error.
#[derive(Debug, Error)]
pub enum CompareError {
    /// An executor binary could not be launched.
    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// An executor exceeded its timeout.
    #[error("executor '{program}' timed out during comparison")]
    ExecutorTimedOut {
        /// The executor program.
        program: String,
    },

    /// The run was cancelled while the comparison was in flight.
    #[error("comparison cancelled")]
    Cancelled,

    /// An artifact or expected file could not be read.
    #[error("IO error during comparison: {0}")]
    Io(#[from] std::io::Error),

    /// The rule was asked to judge something it has no input for.
    #[error("{0}")]
    Rule(String),
}
