//! Run identity.

use crate::utils::Timestamp;
use chrono::Utc;
use uuid::Uuid;

/// Identifies one harness run.
#[derive(Debug, Clone)]
pub struct RunIdentity {
    /// The unique run identifier.
    pub run_id: Uuid,
    /// When the run was created.
    pub started_at: Timestamp,
}

impl RunIdentity {
    /// Creates an identity with a fresh run ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }

    /// Returns the scratch directory name for this run.
    ///
    /// Timestamped (like `checkflow-0213-154210-1a2b3c4d`) so
    /// successive runs never collide and artifacts stay inspectable
    /// per run.
    #[must_use]
    pub fn scratch_dir_name(&self) -> String {
        let hex = self.run_id.simple().to_string();
        format!(
            "checkflow-{}-{}",
            self.started_at.format("%m%d-%H%M%S"),
            &hex[..8]
        )
    }
}

impl Default for RunIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identities_are_unique() {
        let a = RunIdentity::new();
        let b = RunIdentity::new();
        assert_ne!(a.run_id, b.run_id);
        assert_ne!(a.scratch_dir_name(), b.scratch_dir_name());
    }

    #[test]
    fn test_scratch_dir_name_shape() {
        let identity = RunIdentity::new();
        let name = identity.scratch_dir_name();
        assert!(name.starts_with("checkflow-"));
        assert_eq!(name.split('-').count(), 4);
    }
}
