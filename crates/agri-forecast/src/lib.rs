#![deny(missing_docs)]
#![doc = "Training and autoregressive generation of monthly climate forecasts."]

/// Trained forecaster artifact and its summary.
pub mod artifact;
/// Autoregressive rollout over projected drivers.
pub mod generate;
/// Enriched feature vector layout.
pub mod layout;
/// Stacked GRU regression network and its optimiser.
pub mod network;
/// Chronological splitting, windowing and fitting.
pub mod training;

pub use artifact::{
    ArtifactSummary, GenerativeModelArtifact, PeriodRange, SplitBoundaries, TrainedForecaster,
};
pub use generate::generate_forecast;
pub use layout::FeatureLayout;
pub use network::{Adam, RecurrentNetwork};
pub use training::{train_forecaster, ForecastTrainingConfig, SEQ_LENGTH};
