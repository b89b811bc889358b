#![deny(missing_docs)]
#![doc = "Per-crop yield models trained on historical schedules and observed climate."]

/// Trained yield model artifact.
pub mod artifact;
/// Cleaning of raw yield records and crop derivation.
pub mod dataset;
/// Feature naming and row assembly shared with schedule scoring.
pub mod features;
/// Bootstrap-aggregated regression trees.
pub mod forest;
/// Seeded train/test partitioning.
pub mod split;
/// Dataset construction and model fitting.
pub mod trainer;

pub use artifact::{YieldMetrics, YieldModelArtifact};
pub use dataset::{derive_crops, normalize_crop_name, prepare_records};
pub use features::{assemble_row, feature_names, observed_frame, SCHEDULE_FEATURES};
pub use forest::{ForestConfig, RandomForest};
pub use split::train_test_split;
pub use trainer::{build_dataset, train_yield_model, YieldDataset, YieldTrainingConfig};
