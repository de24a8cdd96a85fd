//! Run configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a harness run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Maximum number of cases executing in parallel.
    pub workers: usize,

    /// Timeout applied to stages that do not declare their own.
    pub default_timeout: Duration,

    /// Maximum number of bytes captured per stream per invocation.
    ///
    /// Output beyond the cap is drained and discarded; the truncation
    /// is recorded on the stage result.
    pub capture_cap: usize,

    /// Whether Skipped cases count toward a successful exit code.
    pub skipped_is_success: bool,

    /// Directory under which the per-run scratch tree is created.
    pub scratch_root: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get),
            default_timeout: Duration::from_secs(60),
            capture_cap: 1024 * 1024,
            skipped_is_success: true,
            scratch_root: std::env::temp_dir(),
        }
    }
}

impl RunConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the parallel worker limit (clamped to at least one).
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Sets the default stage timeout.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Sets the per-stream capture cap in bytes.
    #[must_use]
    pub fn with_capture_cap(mut self, cap: usize) -> Self {
        self.capture_cap = cap;
        self
    }

    /// Sets whether Skipped cases count as success.
    #[must_use]
    pub fn with_skipped_is_success(mut self, skipped_is_success: bool) -> Self {
        self.skipped_is_success = skipped_is_success;
        self
    }

    /// Sets the scratch root directory.
    #[must_use]
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = root.into();
        self
    }
}
