#![deny(missing_docs)]
#![doc = "Caller-facing planning operations over pluggable data collaborators."]

/// Versioned, checksummed artifact persistence.
pub mod artifacts;
/// YAML pipeline configuration.
pub mod config;
/// In-memory collaborator implementations.
pub mod memory;
/// Tracing subscriber setup.
pub mod observability;
/// The planning operations.
pub mod service;

pub use artifacts::{decode_artifact, encode_artifact, ArtifactEnvelope, FileArtifactStore, ARTIFACT_SCHEMA};
pub use config::PipelineConfig;
pub use memory::{
    InMemoryArtifactStore, InMemoryClimateStore, InMemoryCropCatalog, InMemoryDriverStore,
    InMemoryLocationCatalog, InMemoryYieldStore,
};
pub use observability::init_tracing;
pub use service::{Collaborators, CropPlanner, PreparedCrops};
