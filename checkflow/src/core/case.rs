//! The immutable test case record.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One unit of test input plus its expected or reference-derived
/// output.
///
/// A `TestCase` is immutable once discovered; the identifier is the
/// stable ordering key for the whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    /// The unique, stable identifier of the case.
    pub id: String,

    /// Path to the primary input artifact (e.g. a source file).
    pub input: PathBuf,

    /// Optional path to a file fed to stages on stdin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdin: Option<PathBuf>,

    /// Optional path to the golden expected-output artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<PathBuf>,
}

impl TestCase {
    /// Creates a new test case with only an input artifact.
    #[must_use]
    pub fn new(id: impl Into<String>, input: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            input: input.into(),
            stdin: None,
            expected: None,
        }
    }

    /// Sets the stdin source file.
    #[must_use]
    pub fn with_stdin(mut self, stdin: impl Into<PathBuf>) -> Self {
        self.stdin = Some(stdin.into());
        self
    }

    /// Sets the expected-output artifact.
    #[must_use]
    pub fn with_expected(mut self, expected: impl Into<PathBuf>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Returns the expected-output path, if recorded.
    #[must_use]
    pub fn expected_path(&self) -> Option<&Path> {
        self.expected.as_deref()
    }
}
