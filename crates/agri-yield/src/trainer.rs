use agri_core::{
    AgriError, Channel, ClimateRecordStore, CropYieldRecord, ErrorInfo, TrainingProvenance,
};
use agri_features::{aggregate, mse, r2};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::artifact::{YieldMetrics, YieldModelArtifact};
use crate::features::{assemble_row, feature_names, observed_frame};
use crate::forest::{ForestConfig, RandomForest};
use crate::split::train_test_split;

/// Yield model training settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldTrainingConfig {
    /// Share of rows held out for metrics.
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Seed of the train/test shuffle.
    #[serde(default = "default_split_seed")]
    pub split_seed: u64,
    /// Forest hyperparameters.
    #[serde(default)]
    pub forest: ForestConfig,
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_split_seed() -> u64 {
    42
}

impl Default for YieldTrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            split_seed: default_split_seed(),
            forest: ForestConfig::default(),
        }
    }
}

/// Supervised rows for one crop.
#[derive(Debug, Clone, PartialEq)]
pub struct YieldDataset {
    /// Column names of `rows`.
    pub feature_names: Vec<String>,
    /// One feature row per usable record.
    pub rows: Vec<Vec<f64>>,
    /// Yield per hectare of each row.
    pub targets: Vec<f64>,
}

impl YieldDataset {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Channels summarised for yield features: targets then drivers.
pub(crate) fn yield_channels() -> Vec<Channel> {
    Channel::TARGETS
        .iter()
        .chain(Channel::DRIVERS.iter())
        .copied()
        .collect()
}

/// Aggregates the observed sowing..harvest climate of every record.
///
/// A record whose window has no observations fails the whole dataset.
pub fn build_dataset(
    records: &[CropYieldRecord],
    climate: &dyn ClimateRecordStore,
) -> Result<YieldDataset, AgriError> {
    let channels = yield_channels();
    let names = feature_names(&channels);
    let mut rows = Vec::with_capacity(records.len());
    let mut targets = Vec::with_capacity(records.len());
    for record in records {
        let observed = climate.window(record.location_id, record.sowing, record.harvest)?;
        if observed.is_empty() {
            return Err(AgriError::NotFound(
                ErrorInfo::new("climate-history", "no climate observations for yield record")
                    .with_context("crop", &record.crop)
                    .with_context("location", record.location_id)
                    .with_context("sowing", record.sowing)
                    .with_context("harvest", record.harvest),
            ));
        }
        let frame = observed_frame(&observed, &channels)?;
        let stats = aggregate(&frame, &[])?;
        rows.push(assemble_row(&names, record.sowing, record.harvest, &stats)?);
        targets.push(record.yield_per_hectare);
    }
    Ok(YieldDataset {
        feature_names: names,
        rows,
        targets,
    })
}

/// Fits a crop's forest on a seeded 80/20 split and scores the held-out part.
pub fn train_yield_model(
    crop: &str,
    dataset: &YieldDataset,
    config: &YieldTrainingConfig,
) -> Result<YieldModelArtifact, AgriError> {
    if dataset.is_empty() {
        return Err(AgriError::NotFound(
            ErrorInfo::new("yield-records", "no usable yield records for crop")
                .with_context("crop", crop),
        ));
    }
    let (train_idx, test_idx) = train_test_split(dataset.len(), config.test_fraction, config.split_seed)
        .map_err(|err| err.with_context("crop", crop))?;

    let pick = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<f64>) {
        (
            idx.iter().map(|&i| dataset.rows[i].clone()).collect(),
            idx.iter().map(|&i| dataset.targets[i]).collect(),
        )
    };
    let (x_train, y_train) = pick(&train_idx);
    let (x_test, y_test) = pick(&test_idx);

    let forest = RandomForest::fit(&x_train, &y_train, &config.forest)
        .map_err(|err| err.with_context("crop", crop))?;
    let predicted = forest.predict(&x_test)?;
    let metrics = YieldMetrics {
        mse: mse(&y_test, &predicted)?,
        r2: r2(&y_test, &predicted)?,
    };
    info!(
        crop,
        train = x_train.len(),
        test = x_test.len(),
        mse = metrics.mse,
        r2 = metrics.r2,
        "yield model trained"
    );

    Ok(YieldModelArtifact {
        crop: crop.to_string(),
        feature_names: dataset.feature_names.clone(),
        forest,
        metrics,
        provenance: TrainingProvenance::now(config.forest.seed, x_train.len()),
    })
}
