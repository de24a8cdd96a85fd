//! Stage and profile specifications.

use crate::compare::CompareRule;
use crate::errors::ProfileError;
use crate::pipeline::template;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Where a stage's stdin comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StdinSpec {
    /// No stdin; the process reads EOF immediately.
    #[default]
    Null,
    /// The case's stdin file, when the case provides one.
    ///
    /// Cases without a stdin file run the stage with no stdin, the
    /// way an interpreter is run without redirection when no input
    /// file exists.
    Case,
    /// A fixed template path (placeholders allowed).
    Path(String),
}

/// Specification for a single stage in a test pipeline.
///
/// Argument strings are templates; see [`crate::pipeline`] for the
/// placeholder forms.
#[derive(Debug, Clone)]
pub struct StageSpec {
    /// The unique name of the stage.
    pub name: String,
    /// The executable to run.
    pub program: String,
    /// Argument templates.
    pub args: Vec<String>,
    /// File name (relative to the case scratch directory) this stage
    /// is expected to produce.
    pub artifact: Option<String>,
    /// Stdin redirection for the stage.
    pub stdin: StdinSpec,
    /// Per-stage timeout; falls back to the run default when absent.
    pub timeout: Option<Duration>,
}

impl StageSpec {
    /// Creates a new stage specification.
    #[must_use]
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            artifact: None,
            stdin: StdinSpec::default(),
            timeout: None,
        }
    }

    /// Appends argument templates.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Declares the artifact file this stage must produce.
    #[must_use]
    pub fn with_artifact(mut self, artifact: impl Into<String>) -> Self {
        self.artifact = Some(artifact.into());
        self
    }

    /// Feeds the case's stdin file to the stage.
    #[must_use]
    pub fn with_case_stdin(mut self) -> Self {
        self.stdin = StdinSpec::Case;
        self
    }

    /// Feeds a fixed template path to the stage on stdin.
    #[must_use]
    pub fn with_stdin_path(mut self, template: impl Into<String>) -> Self {
        self.stdin = StdinSpec::Path(template.into());
        self
    }

    /// Sets a per-stage timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A test profile: an ordered stage sequence plus the equivalence rule
/// used to judge the surviving outputs.
///
/// Stage order is execution order. A later stage may consume an
/// earlier stage's artifact; the reverse is a validation error, which
/// rules out the stale-artifact failure mode of independently
/// coordinated scripts.
#[derive(Debug, Clone)]
pub struct PipelineProfile {
    /// The profile name.
    pub name: String,
    /// Stages, in execution order.
    pub stages: Vec<StageSpec>,
    /// The equivalence rule judging this profile's outputs.
    pub rule: Arc<dyn CompareRule>,
}

impl PipelineProfile {
    /// Creates an empty profile with the given comparison rule.
    #[must_use]
    pub fn new(name: impl Into<String>, rule: Arc<dyn CompareRule>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            rule,
        }
    }

    /// Appends a stage.
    #[must_use]
    pub fn stage(mut self, stage: StageSpec) -> Self {
        self.stages.push(stage);
        self
    }

    /// Validates the profile.
    ///
    /// # Errors
    ///
    /// Returns a [`ProfileError`] when the profile is empty, declares
    /// duplicate stage names, or a template references an unknown
    /// placeholder or a stage that does not run earlier with a
    /// declared artifact.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::EmptyName);
        }
        if self.stages.is_empty() {
            return Err(ProfileError::NoStages {
                profile: self.name.clone(),
            });
        }

        let mut seen: HashSet<&str> = HashSet::new();
        let mut earlier_artifacts: HashSet<&str> = HashSet::new();

        for stage in &self.stages {
            if !seen.insert(stage.name.as_str()) {
                return Err(ProfileError::DuplicateStage {
                    profile: self.name.clone(),
                    stage: stage.name.clone(),
                });
            }

            let mut templates: Vec<&str> = stage.args.iter().map(String::as_str).collect();
            if let StdinSpec::Path(template) = &stage.stdin {
                templates.push(template.as_str());
            }

            for template in templates {
                for (name, param) in template::placeholders(template) {
                    match (name.as_str(), param) {
                        ("input" | "stdin" | "work_dir" | "case", _) => {}
                        ("artifact", None) => {
                            if stage.artifact.is_none() {
                                return Err(ProfileError::UndeclaredArtifact {
                                    stage: stage.name.clone(),
                                });
                            }
                        }
                        ("artifact", Some(reference)) => {
                            if !earlier_artifacts.contains(reference.as_str()) {
                                return Err(ProfileError::ForwardArtifactReference {
                                    stage: stage.name.clone(),
                                    reference,
                                });
                            }
                        }
                        (other, _) => {
                            return Err(ProfileError::UnknownPlaceholder {
                                stage: stage.name.clone(),
                                placeholder: other.to_string(),
                            });
                        }
                    }
                }
            }

            if stage.artifact.is_some() {
                earlier_artifacts.insert(stage.name.as_str());
            }
        }

        Ok(())
    }
}
