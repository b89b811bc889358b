use std::fs;
use std::path::Path;

use agri_core::{AgriError, ErrorInfo};
use agri_forecast::ForecastTrainingConfig;
use agri_ga::GeneticConfig;
use agri_yield::YieldTrainingConfig;
use serde::{Deserialize, Serialize};

/// Settings for every planning operation, loadable from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Forecaster training.
    #[serde(default)]
    pub forecast: ForecastTrainingConfig,
    /// Yield model training.
    #[serde(default, rename = "yield")]
    pub yield_training: YieldTrainingConfig,
    /// Genetic schedule search.
    #[serde(default)]
    pub genetic: GeneticConfig,
    /// Months forecast before optimizing a schedule.
    #[serde(default = "default_horizon_months")]
    pub horizon_months: usize,
}

fn default_horizon_months() -> usize {
    24
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            forecast: ForecastTrainingConfig::default(),
            yield_training: YieldTrainingConfig::default(),
            genetic: GeneticConfig::default(),
            horizon_months: default_horizon_months(),
        }
    }
}

impl PipelineConfig {
    /// Parses a YAML document; missing fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, AgriError> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|err| AgriError::Serde(ErrorInfo::new("config-parse", err.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a YAML file.
    pub fn load(path: &Path) -> Result<Self, AgriError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            AgriError::Storage(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        Self::from_yaml_str(&contents).map_err(|err| err.with_context("path", path.display()))
    }

    /// Validates the nested sections.
    pub fn validate(&self) -> Result<(), AgriError> {
        self.forecast.validate()?;
        self.genetic.validate()?;
        if self.horizon_months == 0 {
            return Err(AgriError::Validation(
                ErrorInfo::new("pipeline-config", "forecast horizon must be at least one month")
                    .with_context("field", "horizon_months"),
            ));
        }
        Ok(())
    }
}
