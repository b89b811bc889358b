//! The planning operations exposed to callers.
//!
//! Every operation runs its CPU-bound work on tokio's blocking pool and is
//! awaited by the caller; there is no cancellation.

use std::collections::BTreeMap;
use std::sync::Arc;

use agri_core::{
    AgriError, ArtifactStore, ClimateFrame, ClimateRecordStore, Crop, CropCatalog,
    CropYieldRecord, CropYieldStore, ErrorInfo, FutureDriverStore, Location, LocationCatalog,
    LocationId,
};
use agri_forecast::{
    generate_forecast, train_forecaster, ArtifactSummary, FeatureLayout, GenerativeModelArtifact,
    SEQ_LENGTH,
};
use agri_ga::{optimize, FitnessContext, OptimizationReport};
use agri_yield::{
    build_dataset, derive_crops, prepare_records, train_yield_model, YieldMetrics,
    YieldModelArtifact,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::PipelineConfig;

/// Data-access collaborators the planner is wired to.
#[derive(Clone)]
pub struct Collaborators {
    /// Observed monthly climate.
    pub climate: Arc<dyn ClimateRecordStore>,
    /// Projected exogenous drivers.
    pub drivers: Arc<dyn FutureDriverStore>,
    /// Crop catalog.
    pub crops: Arc<dyn CropCatalog>,
    /// Location catalog.
    pub locations: Arc<dyn LocationCatalog>,
    /// Historical yields.
    pub yields: Arc<dyn CropYieldStore>,
    /// Forecasters, one per location.
    pub generative_models: Arc<dyn ArtifactStore<GenerativeModelArtifact>>,
    /// Yield models, one per crop.
    pub yield_models: Arc<dyn ArtifactStore<YieldModelArtifact>>,
}

/// Cleaned yield records and the crops derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedCrops {
    /// Records after filtering, outlier removal and merging.
    pub records: Vec<CropYieldRecord>,
    /// Crops written to the catalog.
    pub crops: Vec<Crop>,
}

struct Planner {
    stores: Collaborators,
    config: PipelineConfig,
}

/// Cheaply cloneable handle running the planning operations.
#[derive(Clone)]
pub struct CropPlanner {
    inner: Arc<Planner>,
}

async fn run_blocking<T, F>(
    operation: &'static str,
    family: fn(ErrorInfo) -> AgriError,
    work: F,
) -> Result<T, AgriError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AgriError> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|err| {
        family(
            ErrorInfo::new("worker-failed", "blocking worker did not complete")
                .with_context("operation", operation)
                .with_context("reason", err),
        )
    })?
}

impl CropPlanner {
    /// Wires the planner; the configuration is validated up front.
    pub fn new(stores: Collaborators, config: PipelineConfig) -> Result<Self, AgriError> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(Planner { stores, config }),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.inner.config
    }

    /// Trains and stores the forecaster of a location, replacing any previous one.
    pub async fn train_generative_model(
        &self,
        location: LocationId,
    ) -> Result<ArtifactSummary, AgriError> {
        let inner = Arc::clone(&self.inner);
        run_blocking("train_generative_model", AgriError::Training, move || {
            inner.train_generative_model(location)
        })
        .await
    }

    /// Extends a location's climate `horizon` months past its last observation.
    pub async fn generate_forecast(
        &self,
        location: LocationId,
        horizon: usize,
    ) -> Result<ClimateFrame, AgriError> {
        let inner = Arc::clone(&self.inner);
        run_blocking("generate_forecast", AgriError::Evaluation, move || {
            inner.generate_forecast(location, horizon)
        })
        .await
    }

    /// Trains and stores the yield model of a crop.
    pub async fn train_yield_model(&self, crop: &str) -> Result<YieldMetrics, AgriError> {
        let inner = Arc::clone(&self.inner);
        let crop = crop.to_string();
        run_blocking("train_yield_model", AgriError::Training, move || {
            inner.train_yield_model(&crop)
        })
        .await
    }

    /// Trains every catalogued crop in name order, stopping at the first failure.
    pub async fn train_all_yield_models(
        &self,
    ) -> Result<BTreeMap<String, YieldMetrics>, AgriError> {
        let inner = Arc::clone(&self.inner);
        run_blocking("train_all_yield_models", AgriError::Training, move || {
            inner.train_all_yield_models()
        })
        .await
    }

    /// Searches the best sowing and harvest months for a crop at a location.
    pub async fn optimize_schedule(
        &self,
        crop: &str,
        location: LocationId,
    ) -> Result<OptimizationReport, AgriError> {
        let inner = Arc::clone(&self.inner);
        let crop = crop.to_string();
        run_blocking("optimize_schedule", AgriError::Evaluation, move || {
            inner.optimize_schedule(&crop, location)
        })
        .await
    }

    /// Cleans raw yield records and registers the crops they describe.
    pub async fn prepare_crops(
        &self,
        records: Vec<CropYieldRecord>,
    ) -> Result<PreparedCrops, AgriError> {
        let inner = Arc::clone(&self.inner);
        run_blocking("prepare_crops", AgriError::Storage, move || {
            inner.prepare_crops(records)
        })
        .await
    }
}

impl Planner {
    fn location(&self, id: LocationId) -> Result<Location, AgriError> {
        self.stores.locations.get(id)?.ok_or_else(|| {
            AgriError::NotFound(
                ErrorInfo::new("location", "unknown location").with_context("location", id),
            )
        })
    }

    fn crop(&self, name: &str) -> Result<Crop, AgriError> {
        self.stores.crops.get(name)?.ok_or_else(|| {
            AgriError::NotFound(ErrorInfo::new("crop", "unknown crop").with_context("crop", name))
        })
    }

    fn train_generative_model(&self, location: LocationId) -> Result<ArtifactSummary, AgriError> {
        self.location(location)?;
        let history = self.stores.climate.history(location)?;
        let artifact = train_forecaster(
            location,
            &history,
            &FeatureLayout::default(),
            &self.config.forecast,
        )?;
        let summary = artifact.summary();
        self.stores.generative_models.put(&artifact.key(), artifact)?;
        info!(location = %location, rmse = summary.rmse, "forecaster stored");
        Ok(summary)
    }

    fn generate_forecast(
        &self,
        location: LocationId,
        horizon: usize,
    ) -> Result<ClimateFrame, AgriError> {
        let site = self.location(location)?;
        let key = location.to_string();
        let artifact = self.stores.generative_models.get(&key)?.ok_or_else(|| {
            AgriError::NotFound(
                ErrorInfo::new("generative-model", "no forecaster trained for location")
                    .with_context("location", location)
                    .with_hint("train the forecaster first"),
            )
        })?;
        let seed = self.stores.climate.most_recent(location, SEQ_LENGTH)?;
        let Some(last) = seed.last() else {
            return Err(AgriError::NotFound(
                ErrorInfo::new("climate-history", "no climate history for location")
                    .with_context("location", location),
            ));
        };
        let drivers = if horizon == 0 {
            Vec::new()
        } else {
            let start = last.period.next();
            let end = start.offset(horizon as i64 - 1);
            let drivers = self
                .stores
                .drivers
                .nearest(site.longitude, site.latitude, start, end)?;
            if drivers.len() != horizon {
                return Err(AgriError::Validation(
                    ErrorInfo::new("driver-horizon", "projected drivers do not cover the horizon")
                        .with_context("location", location)
                        .with_context("horizon", horizon)
                        .with_context("available", drivers.len())
                        .with_context("from", start)
                        .with_context("to", end),
                ));
            }
            drivers
        };
        generate_forecast(&artifact, &seed, &drivers)
            .map_err(|err| err.with_context("location", location))
    }

    fn train_yield_model(&self, crop: &str) -> Result<YieldMetrics, AgriError> {
        self.crop(crop)?;
        let records = self.stores.yields.records(crop)?;
        let dataset = build_dataset(&records, self.stores.climate.as_ref())?;
        let artifact = train_yield_model(crop, &dataset, &self.config.yield_training)?;
        let metrics = artifact.metrics.clone();
        let key = artifact.key().to_string();
        self.stores.yield_models.put(&key, artifact)?;
        Ok(metrics)
    }

    fn train_all_yield_models(&self) -> Result<BTreeMap<String, YieldMetrics>, AgriError> {
        let mut trained = BTreeMap::new();
        for crop in self.stores.crops.list()? {
            let metrics = self
                .train_yield_model(&crop.name)
                .map_err(|err| err.with_context("crop", &crop.name))?;
            trained.insert(crop.name, metrics);
        }
        Ok(trained)
    }

    fn optimize_schedule(
        &self,
        crop: &str,
        location: LocationId,
    ) -> Result<OptimizationReport, AgriError> {
        let crop = self.crop(crop)?;
        let model = self.stores.yield_models.get(&crop.name)?.ok_or_else(|| {
            AgriError::NotFound(
                ErrorInfo::new("yield-model", "no yield model trained for crop")
                    .with_context("crop", &crop.name)
                    .with_hint("train the yield model first"),
            )
        })?;
        let forecast = self.generate_forecast(location, self.config.horizon_months)?;
        let context = FitnessContext::new(forecast, crop, model);
        let report = optimize(&context, &self.config.genetic)?;
        if let Some(best) = report.top.first() {
            info!(
                crop = %context.crop().name,
                location = %location,
                sowing = %best.sowing,
                harvest = %best.harvest,
                fitness = best.fitness,
                "schedule optimized"
            );
        }
        Ok(report)
    }

    fn prepare_crops(&self, records: Vec<CropYieldRecord>) -> Result<PreparedCrops, AgriError> {
        let raw = records.len();
        let records = prepare_records(records);
        let crops = derive_crops(&records, Utc::now());
        for crop in &crops {
            self.stores.crops.put(crop.clone())?;
        }
        info!(raw, kept = records.len(), crops = crops.len(), "yield records prepared");
        Ok(PreparedCrops { records, crops })
    }
}
