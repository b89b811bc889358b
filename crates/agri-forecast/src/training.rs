use agri_core::{AgriError, ClimateRecord, ErrorInfo, LocationId, RngHandle, TrainingProvenance};
use agri_features::{rmse, StandardScaler};
use nalgebra::DVector;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::artifact::{GenerativeModelArtifact, PeriodRange, SplitBoundaries, TrainedForecaster};
use crate::layout::FeatureLayout;
use crate::network::{Adam, RecurrentNetwork};

/// Months of history consumed per prediction.
pub const SEQ_LENGTH: usize = 12;

const TRAIN_FRACTION: f64 = 0.7;
const VALIDATION_END_FRACTION: f64 = 0.85;

/// Hyperparameters of forecaster training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastTrainingConfig {
    /// Hidden width of every recurrent layer, bottom first.
    #[serde(default = "default_hidden_sizes")]
    pub hidden_sizes: Vec<usize>,
    /// Inverted dropout rate applied after every recurrent layer while training.
    #[serde(default = "default_dropout")]
    pub dropout: f64,
    /// Adam step size.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Adam first-moment decay.
    #[serde(default = "default_beta1")]
    pub beta1: f64,
    /// Adam second-moment decay.
    #[serde(default = "default_beta2")]
    pub beta2: f64,
    /// Adam denominator floor.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Windows per optimiser step.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Passes over the training windows.
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    /// Global gradient-norm ceiling (0 disables clipping).
    #[serde(default = "default_clip_norm")]
    pub clip_norm: f64,
    /// Epochs without validation improvement before stopping early.
    #[serde(default)]
    pub patience: Option<usize>,
    /// Seed for initialisation, shuffling and dropout.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_hidden_sizes() -> Vec<usize> {
    vec![50, 50, 50]
}

fn default_dropout() -> f64 {
    0.2
}

fn default_learning_rate() -> f64 {
    0.001
}

fn default_beta1() -> f64 {
    0.9
}

fn default_beta2() -> f64 {
    0.999
}

fn default_epsilon() -> f64 {
    1e-7
}

fn default_batch_size() -> usize {
    32
}

fn default_epochs() -> usize {
    50
}

fn default_clip_norm() -> f64 {
    5.0
}

fn default_seed() -> u64 {
    42
}

impl Default for ForecastTrainingConfig {
    fn default() -> Self {
        Self {
            hidden_sizes: default_hidden_sizes(),
            dropout: default_dropout(),
            learning_rate: default_learning_rate(),
            beta1: default_beta1(),
            beta2: default_beta2(),
            epsilon: default_epsilon(),
            batch_size: default_batch_size(),
            epochs: default_epochs(),
            clip_norm: default_clip_norm(),
            patience: None,
            seed: default_seed(),
        }
    }
}

impl ForecastTrainingConfig {
    /// Rejects configurations that cannot train.
    pub fn validate(&self) -> Result<(), AgriError> {
        let invalid = |field: &str, value: String| -> Result<(), AgriError> {
            Err(AgriError::Validation(
                ErrorInfo::new("forecast-config", "invalid forecaster training setting")
                    .with_context("field", field)
                    .with_context("value", value),
            ))
        };
        if self.hidden_sizes.is_empty() || self.hidden_sizes.contains(&0) {
            return invalid("hidden_sizes", format!("{:?}", self.hidden_sizes));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return invalid("dropout", self.dropout.to_string());
        }
        if self.learning_rate <= 0.0 {
            return invalid("learning_rate", self.learning_rate.to_string());
        }
        if self.batch_size == 0 {
            return invalid("batch_size", "0".into());
        }
        if self.epochs == 0 {
            return invalid("epochs", "0".into());
        }
        Ok(())
    }
}

struct Window {
    inputs: Vec<DVector<f64>>,
    label: DVector<f64>,
}

/// Fits a forecaster on one location's full chronological history.
///
/// With an empty target set the artifact carries no network and an RMSE of 0.
pub fn train_forecaster(
    location_id: LocationId,
    history: &[ClimateRecord],
    layout: &FeatureLayout,
    config: &ForecastTrainingConfig,
) -> Result<GenerativeModelArtifact, AgriError> {
    config.validate()?;
    if history.is_empty() {
        return Err(AgriError::NotFound(
            ErrorInfo::new("climate-history", "no climate history for location")
                .with_context("location", location_id),
        ));
    }
    if let Some(pair) = history.windows(2).find(|pair| pair[1].period <= pair[0].period) {
        return Err(AgriError::Validation(
            ErrorInfo::new("unordered-history", "climate history must be strictly chronological")
                .with_context("previous", pair[0].period)
                .with_context("next", pair[1].period),
        ));
    }

    let n = history.len();
    let train_end = (n as f64 * TRAIN_FRACTION).floor() as usize;
    let val_end = (n as f64 * VALIDATION_END_FRACTION).floor() as usize;
    let boundaries = SplitBoundaries {
        train: PeriodRange::of(&history[..train_end]),
        validation: PeriodRange::of(&history[train_end..val_end]),
        test: PeriodRange::of(&history[val_end..]),
    };

    if layout.targets().is_empty() {
        info!(location = %location_id, "no target channels; storing placeholder forecaster");
        return Ok(GenerativeModelArtifact {
            location_id,
            layout: layout.clone(),
            model: None,
            rmse: 0.0,
            boundaries,
            provenance: TrainingProvenance::now(config.seed, 0),
        });
    }

    let train_windows = train_end.saturating_sub(SEQ_LENGTH);
    let test_windows = (n - val_end).saturating_sub(SEQ_LENGTH);
    if train_windows == 0 || test_windows == 0 {
        return Err(AgriError::Validation(
            ErrorInfo::new("insufficient-history", "history too short to build training windows")
                .with_context("records", n)
                .with_context("train_windows", train_windows)
                .with_context("test_windows", test_windows)
                .with_hint("each split needs more than 12 consecutive months"),
        ));
    }

    let rows: Vec<Vec<f64>> = history.iter().map(|r| layout.enrich(r)).collect();
    let targets: Vec<Vec<f64>> = rows.iter().map(|r| layout.target_part(r).to_vec()).collect();

    let input_scaler = StandardScaler::fit(&rows[..train_end])?;
    let target_scaler = StandardScaler::fit(&targets[..train_end])?;
    let scaled_rows = input_scaler.transform(&rows)?;
    let scaled_targets = target_scaler.transform(&targets)?;

    let train = windows(&scaled_rows[..train_end], &scaled_targets[..train_end]);
    let validation = windows(&scaled_rows[train_end..val_end], &scaled_targets[train_end..val_end]);
    let test = windows(&scaled_rows[val_end..], &scaled_targets[val_end..]);

    let mut rng = RngHandle::from_seed(config.seed);
    let network = RecurrentNetwork::new(
        layout.width(),
        &config.hidden_sizes,
        layout.targets().len(),
        config.dropout,
        &mut rng,
    )?;
    let network = fit(network, &train, &validation, config, &mut rng)?;

    let mut truth = Vec::new();
    let mut predicted = Vec::new();
    for window in &test {
        let trace = network.forward(&window.inputs, None);
        truth.extend(window.label.iter().copied());
        predicted.extend(trace.output.iter().copied());
    }
    let test_rmse = rmse(&truth, &predicted)?;
    if !test_rmse.is_finite() {
        return Err(AgriError::Training(
            ErrorInfo::new("non-finite-loss", "forecaster diverged")
                .with_context("location", location_id),
        ));
    }
    info!(
        location = %location_id,
        train_windows = train.len(),
        test_windows = test.len(),
        rmse = test_rmse,
        "forecaster trained"
    );

    Ok(GenerativeModelArtifact {
        location_id,
        layout: layout.clone(),
        model: Some(TrainedForecaster {
            network,
            input_scaler,
            target_scaler,
        }),
        rmse: test_rmse,
        boundaries,
        provenance: TrainingProvenance::now(config.seed, train.len()),
    })
}

fn windows(rows: &[Vec<f64>], targets: &[Vec<f64>]) -> Vec<Window> {
    if rows.len() <= SEQ_LENGTH {
        return Vec::new();
    }
    (0..rows.len() - SEQ_LENGTH)
        .map(|i| Window {
            inputs: rows[i..i + SEQ_LENGTH]
                .iter()
                .map(|row| DVector::from_column_slice(row))
                .collect(),
            label: DVector::from_column_slice(&targets[i + SEQ_LENGTH]),
        })
        .collect()
}

fn mean_loss(network: &RecurrentNetwork, windows: &[Window]) -> f64 {
    let total: f64 = windows
        .iter()
        .map(|w| {
            let diff = network.forward(&w.inputs, None).output - &w.label;
            diff.norm_squared() / diff.len() as f64
        })
        .sum();
    total / windows.len() as f64
}

fn fit(
    mut network: RecurrentNetwork,
    train: &[Window],
    validation: &[Window],
    config: &ForecastTrainingConfig,
    rng: &mut RngHandle,
) -> Result<RecurrentNetwork, AgriError> {
    let mut adam = Adam::new(config.learning_rate, config.beta1, config.beta2, config.epsilon);
    let mut order: Vec<usize> = (0..train.len()).collect();
    let mut best: Option<(f64, RecurrentNetwork)> = None;
    let mut stale = 0usize;

    for epoch in 0..config.epochs {
        order.shuffle(rng.inner_mut());
        let mut epoch_loss = 0.0;
        for batch in order.chunks(config.batch_size) {
            let mut grads = network.zeros_like();
            let scale = 1.0 / batch.len() as f64;
            for &idx in batch {
                let window = &train[idx];
                let trace = network.forward(&window.inputs, Some(&mut *rng));
                let diff = &trace.output - &window.label;
                let outputs = diff.len() as f64;
                epoch_loss += diff.norm_squared() / outputs;
                let d_output = diff * (2.0 * scale / outputs);
                network.backward(&trace, &d_output, &mut grads);
            }
            grads.clip_global_norm(config.clip_norm);
            adam.step(&mut network, &grads);
        }
        let train_loss = epoch_loss / train.len() as f64;
        if !train_loss.is_finite() {
            return Err(AgriError::Training(
                ErrorInfo::new("non-finite-loss", "training loss is not finite")
                    .with_context("epoch", epoch),
            ));
        }

        if validation.is_empty() {
            debug!(epoch, train_loss, "epoch finished");
            continue;
        }
        let val_loss = mean_loss(&network, validation);
        debug!(epoch, train_loss, val_loss, "epoch finished");

        if let Some(patience) = config.patience {
            let improved = best.as_ref().map_or(true, |(loss, _)| val_loss < *loss);
            if improved {
                best = Some((val_loss, network.clone()));
                stale = 0;
            } else {
                stale += 1;
                if stale >= patience {
                    debug!(epoch, "validation loss stalled; stopping early");
                    break;
                }
            }
        }
    }

    Ok(match best {
        Some((_, weights)) => weights,
        None => network,
    })
}
