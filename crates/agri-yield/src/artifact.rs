use agri_core::{AgriError, ErrorInfo, TrainingProvenance};
use serde::{Deserialize, Serialize};

use crate::forest::RandomForest;

/// Held-out quality of a yield model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldMetrics {
    /// Mean squared error.
    pub mse: f64,
    /// Coefficient of determination.
    pub r2: f64,
}

/// Yield model persisted once per crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldModelArtifact {
    /// Crop the model predicts for.
    pub crop: String,
    /// Input feature names in model order.
    pub feature_names: Vec<String>,
    /// Fitted regressor.
    pub forest: RandomForest,
    /// Test-split metrics.
    pub metrics: YieldMetrics,
    /// Training provenance.
    pub provenance: TrainingProvenance,
}

impl YieldModelArtifact {
    /// Storage key of the artifact.
    pub fn key(&self) -> &str {
        &self.crop
    }

    /// Predicted yield for a row laid out like [`YieldModelArtifact::feature_names`].
    pub fn predict(&self, row: &[f64]) -> Result<f64, AgriError> {
        if row.len() != self.feature_names.len() {
            return Err(AgriError::Evaluation(
                ErrorInfo::new("feature-width", "row does not match the model features")
                    .with_context("crop", &self.crop)
                    .with_context("expected", self.feature_names.len())
                    .with_context("actual", row.len()),
            ));
        }
        self.forest.predict_row(row)
    }
}
