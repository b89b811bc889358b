//! Schema and provenance descriptors attached to persisted model artifacts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic version describing the schema of serialized artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Two versions are readable by each other when their major versions agree.
    pub fn is_compatible_with(&self, other: &SchemaVersion) -> bool {
        self.major == other.major
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Provenance recorded alongside every trained model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingProvenance {
    /// Master deterministic seed used for all randomness during training.
    pub seed: u64,
    /// Number of supervised rows or windows the model was fitted on.
    pub training_rows: usize,
    /// UTC timestamp recording when the artifact was produced.
    pub trained_at: DateTime<Utc>,
    /// Version map for the crates involved in the run.
    pub tool_versions: BTreeMap<String, String>,
}

impl TrainingProvenance {
    /// Stamps a provenance record with the current time.
    pub fn now(seed: u64, training_rows: usize) -> Self {
        let mut tool_versions = BTreeMap::new();
        tool_versions.insert(
            env!("CARGO_PKG_NAME").to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        Self {
            seed,
            training_rows,
            trained_at: Utc::now(),
            tool_versions,
        }
    }
}
