//! Report persistence sinks.

use super::Report;
use std::path::PathBuf;

/// A caller-supplied destination for a finalized report.
///
/// The harness itself never persists run state; writing a report
/// anywhere is an explicit caller action through one of these.
pub trait ReportSink: Send + Sync {
    /// Writes the finalized report.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the destination cannot be written.
    fn write(&self, report: &Report) -> std::io::Result<()>;
}

/// Writes `result.log` (human-readable summary) and `report.jsonl`
/// (one JSON record per case) into a directory.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    dir: PathBuf,
}

impl FileReportSink {
    /// Creates a sink writing into the given directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the summary file path.
    #[must_use]
    pub fn summary_path(&self) -> PathBuf {
        self.dir.join("result.log")
    }

    /// Returns the JSON Lines file path.
    #[must_use]
    pub fn records_path(&self) -> PathBuf {
        self.dir.join("report.jsonl")
    }
}

impl ReportSink for FileReportSink {
    fn write(&self, report: &Report) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.summary_path(), report.render_summary())?;
        let jsonl = report.to_jsonl().map_err(std::io::Error::other)?;
        std::fs::write(self.records_path(), jsonl)?;
        Ok(())
    }
}
