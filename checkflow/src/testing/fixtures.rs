//! Case-tree fixtures.

use anyhow::{Context, Result};
use std::path::Path;

/// Writes one case's files into a directory-source tree.
///
/// Creates `<id>.sy` with the given content, plus optional `<id>.in`
/// and `<id>.out` siblings. Nested identifiers create subdirectories.
///
/// # Errors
///
/// Returns an error if any file cannot be written.
pub fn write_case_files(
    root: &Path,
    id: &str,
    input: &str,
    stdin: Option<&str>,
    expected: Option<&str>,
) -> Result<()> {
    let base = root.join(id);
    if let Some(parent) = base.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating case directory for '{id}'"))?;
    }

    std::fs::write(base.with_extension("sy"), input)
        .with_context(|| format!("writing input for case '{id}'"))?;
    if let Some(text) = stdin {
        std::fs::write(base.with_extension("in"), text)
            .with_context(|| format!("writing stdin for case '{id}'"))?;
    }
    if let Some(text) = expected {
        std::fs::write(base.with_extension("out"), text)
            .with_context(|| format!("writing expected output for case '{id}'"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{CaseSource, DirectorySource};

    #[test]
    fn test_fixture_round_trips_through_discovery() {
        let dir = tempfile::tempdir().unwrap();
        write_case_files(dir.path(), "suite/01_io", "input", Some("stdin"), Some("out")).unwrap();
        write_case_files(dir.path(), "suite/02_bare", "input", None, None).unwrap();

        let cases = DirectorySource::new(dir.path()).discover().unwrap();

        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].id, "suite/01_io");
        assert!(cases[0].stdin.is_some());
        assert!(cases[0].expected.is_some());
        assert!(cases[1].stdin.is_none());
    }
}
