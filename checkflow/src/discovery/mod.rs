//! Case discovery.
//!
//! A case source enumerates [`TestCase`]s in deterministic order:
//! lexicographic by identifier for directory trees, manifest order for
//! explicit manifests. Discovery is read-only; a malformed source is
//! fatal to the run before any case executes.

mod directory;
mod manifest;

pub use directory::DirectorySource;
pub use manifest::ManifestSource;

use crate::core::TestCase;
use crate::errors::DiscoveryError;

/// A source of test cases.
pub trait CaseSource: Send + Sync {
    /// Enumerates the cases, in the order the report will present
    /// them.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscoveryError`] when the source is unreadable or
    /// references files that do not exist.
    fn discover(&self) -> Result<Vec<TestCase>, DiscoveryError>;
}
