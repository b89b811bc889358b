use agri_core::{ClimateRecord, LocationId, TrainingProvenance, YearMonth};
use agri_features::StandardScaler;
use serde::{Deserialize, Serialize};

use crate::layout::FeatureLayout;
use crate::network::RecurrentNetwork;

/// Inclusive month range covered by a chronological split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    /// First month of the split.
    pub start: YearMonth,
    /// Last month of the split.
    pub end: YearMonth,
}

impl PeriodRange {
    /// Range spanned by a chronological slice; `None` when empty.
    pub fn of(records: &[ClimateRecord]) -> Option<Self> {
        Some(Self {
            start: records.first()?.period,
            end: records.last()?.period,
        })
    }
}

/// Year-month boundaries of the train, validation and test partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitBoundaries {
    /// Training partition.
    pub train: Option<PeriodRange>,
    /// Validation partition.
    pub validation: Option<PeriodRange>,
    /// Held-out test partition.
    pub test: Option<PeriodRange>,
}

/// Network and both scalers of a trained forecaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedForecaster {
    /// Recurrent regression network.
    pub network: RecurrentNetwork,
    /// Scaler over the full enriched feature vector.
    pub input_scaler: StandardScaler,
    /// Scaler over the target channels.
    pub target_scaler: StandardScaler,
}

/// Generative model persisted once per location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerativeModelArtifact {
    /// Location the model was trained for.
    pub location_id: LocationId,
    /// Feature layout the model consumes and emits.
    pub layout: FeatureLayout,
    /// Trained model; `None` for the placeholder stored when there are no targets.
    pub model: Option<TrainedForecaster>,
    /// RMSE on the standardized test split.
    pub rmse: f64,
    /// Partition boundaries.
    pub boundaries: SplitBoundaries,
    /// Training provenance.
    pub provenance: TrainingProvenance,
}

impl GenerativeModelArtifact {
    /// Storage key of the artifact.
    pub fn key(&self) -> String {
        self.location_id.to_string()
    }

    /// Lightweight description returned to callers after training.
    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            location_id: self.location_id,
            rmse: self.rmse,
            boundaries: self.boundaries,
            placeholder: self.model.is_none(),
            training_windows: self.provenance.training_rows,
        }
    }
}

/// Caller-facing summary of a generative model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    /// Location the model belongs to.
    pub location_id: LocationId,
    /// Test RMSE.
    pub rmse: f64,
    /// Partition boundaries.
    pub boundaries: SplitBoundaries,
    /// Whether training was skipped because there were no targets.
    pub placeholder: bool,
    /// Number of supervised training windows.
    pub training_windows: usize,
}
