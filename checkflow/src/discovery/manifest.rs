//! Manifest case source.

use super::CaseSource;
use crate::core::TestCase;
use crate::errors::DiscoveryError;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Discovers cases from an explicit JSON manifest.
///
/// The manifest dictates case order. Relative paths are resolved
/// against the manifest's parent directory. Every referenced file must
/// exist; a broken reference is fatal to the run.
///
/// ```json
/// {
///   "cases": [
///     {"id": "01_add", "input": "01_add.sy", "expected": "01_add.out"},
///     {"id": "02_io", "input": "02_io.sy", "stdin": "02_io.in"}
///   ]
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ManifestSource {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ManifestDoc {
    cases: Vec<ManifestCase>,
}

#[derive(Debug, Deserialize)]
struct ManifestCase {
    id: String,
    input: PathBuf,
    #[serde(default)]
    stdin: Option<PathBuf>,
    #[serde(default)]
    expected: Option<PathBuf>,
}

impl ManifestSource {
    /// Creates a source reading the given manifest file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir().join(path)
        }
    }

    fn checked(&self, case_id: &str, path: PathBuf) -> Result<PathBuf, DiscoveryError> {
        if path.is_file() {
            Ok(path)
        } else {
            Err(DiscoveryError::MissingFile {
                case_id: case_id.to_string(),
                path,
            })
        }
    }
}

impl CaseSource for ManifestSource {
    fn discover(&self) -> Result<Vec<TestCase>, DiscoveryError> {
        let text =
            std::fs::read_to_string(&self.path).map_err(|source| DiscoveryError::Unreadable {
                path: self.path.clone(),
                source,
            })?;

        let doc: ManifestDoc =
            serde_json::from_str(&text).map_err(|err| DiscoveryError::MalformedManifest {
                path: self.path.clone(),
                message: err.to_string(),
            })?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut cases = Vec::with_capacity(doc.cases.len());

        for entry in doc.cases {
            if !seen.insert(entry.id.clone()) {
                return Err(DiscoveryError::DuplicateCase { case_id: entry.id });
            }

            let input = self.checked(&entry.id, self.resolve(&entry.input))?;
            let mut case = TestCase::new(&entry.id, input);

            if let Some(stdin) = entry.stdin {
                case = case.with_stdin(self.checked(&entry.id, self.resolve(&stdin))?);
            }
            if let Some(expected) = entry.expected {
                case = case.with_expected(self.checked(&entry.id, self.resolve(&expected))?);
            }

            cases.push(case);
        }

        Ok(cases)
    }
}
