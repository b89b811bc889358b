use std::sync::Arc;

use agri_core::{AgriError, ClimateFrame, Crop, YearMonth, CYCLICAL_COLUMNS};
use agri_features::aggregate;
use agri_yield::{assemble_row, YieldModelArtifact};

use crate::chromosome::Chromosome;

#[derive(Debug)]
struct FitnessInputs {
    forecast: ClimateFrame,
    crop: Crop,
    model: YieldModelArtifact,
}

/// Read-only inputs shared by every fitness worker.
///
/// Cloning is cheap; every worker receives its own handle.
#[derive(Debug, Clone)]
pub struct FitnessContext {
    inner: Arc<FitnessInputs>,
}

impl FitnessContext {
    /// Bundles a forecast, the crop's duration bounds and its yield model.
    pub fn new(forecast: ClimateFrame, crop: Crop, model: YieldModelArtifact) -> Self {
        Self {
            inner: Arc::new(FitnessInputs {
                forecast,
                crop,
                model,
            }),
        }
    }

    /// Forecast the candidates index into.
    pub fn forecast(&self) -> &ClimateFrame {
        &self.inner.forecast
    }

    /// Crop being scheduled.
    pub fn crop(&self) -> &Crop {
        &self.inner.crop
    }

    /// Sowing and harvest months of a candidate, when both indices are in range.
    pub fn schedule(&self, chromosome: &Chromosome) -> Option<(YearMonth, YearMonth)> {
        let (sowing, harvest) = chromosome.decode();
        let periods = self.inner.forecast.periods();
        Some((*periods.get(sowing)?, *periods.get(harvest)?))
    }

    /// Whether the candidate lies in the forecast and within the crop's duration bounds.
    pub fn is_feasible(&self, chromosome: &Chromosome) -> bool {
        self.schedule(chromosome)
            .map(|(sowing, harvest)| self.inner.crop.accepts_duration(sowing.months_until(harvest)))
            .unwrap_or(false)
    }

    /// Predicted yield of a candidate; infeasible candidates score exactly 0.
    pub fn evaluate(&self, chromosome: &Chromosome) -> Result<f64, AgriError> {
        if !self.is_feasible(chromosome) {
            return Ok(0.0);
        }
        let (sowing_idx, harvest_idx) = chromosome.decode();
        let forecast = &self.inner.forecast;
        let sowing = forecast.periods()[sowing_idx];
        let harvest = forecast.periods()[harvest_idx];
        self.score(sowing_idx, harvest_idx, sowing, harvest)
            .map_err(|err| escalate(err, chromosome))
    }

    fn score(
        &self,
        sowing_idx: usize,
        harvest_idx: usize,
        sowing: YearMonth,
        harvest: YearMonth,
    ) -> Result<f64, AgriError> {
        let window = self.inner.forecast.slice(sowing_idx, harvest_idx)?;
        let stats = aggregate(&window, &CYCLICAL_COLUMNS)?;
        let row = assemble_row(&self.inner.model.feature_names, sowing, harvest, &stats)?;
        self.inner.model.predict(&row)
    }
}

/// Failures while scoring abort the run, so they are reported as evaluation errors.
fn escalate(err: AgriError, chromosome: &Chromosome) -> AgriError {
    let err = if err.is_fatal() {
        err
    } else {
        AgriError::Evaluation(err.info().clone())
    };
    err.with_context("chromosome", chromosome)
}
