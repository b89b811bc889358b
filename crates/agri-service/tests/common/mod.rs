#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use agri_core::{
    Channel, ClimateRecord, CropYieldRecord, DriverRecord, Location, LocationId, YearMonth,
};
use agri_forecast::{ForecastTrainingConfig, GenerativeModelArtifact};
use agri_ga::GeneticConfig;
use agri_service::{
    Collaborators, CropPlanner, InMemoryArtifactStore, InMemoryClimateStore, InMemoryCropCatalog,
    InMemoryDriverStore, InMemoryLocationCatalog, InMemoryYieldStore, PipelineConfig,
};
use agri_yield::{ForestConfig, YieldModelArtifact, YieldTrainingConfig};

pub const HISTORY_MONTHS: usize = 100;

pub fn site() -> LocationId {
    LocationId::from_raw(7)
}

pub fn ym(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).unwrap()
}

/// First observed month; the last one is 2023-04.
pub fn history_start() -> YearMonth {
    ym(2015, 1)
}

pub fn history() -> Vec<ClimateRecord> {
    (0..HISTORY_MONTHS)
        .map(|i| {
            let period = history_start().offset(i as i64);
            let phase = f64::from(period.month) / 12.0 * std::f64::consts::TAU;
            let mut values = [0.0; Channel::COUNT];
            for (idx, value) in values.iter_mut().enumerate() {
                *value = 5.0 * (idx as f64 + 1.0) + (phase + idx as f64).cos() * 2.0;
            }
            ClimateRecord::new(site(), period, values)
        })
        .collect()
}

pub fn drivers_at(longitude: f64, latitude: f64, base: f64) -> Vec<DriverRecord> {
    (0..36)
        .map(|i| {
            let mut values = BTreeMap::new();
            values.insert(Channel::Temperature2m, base + i as f64 * 0.1);
            values.insert(Channel::TotalPrecipitation, 0.002 * (i % 5) as f64);
            DriverRecord {
                period: ym(2023, 5).offset(i),
                longitude,
                latitude,
                values,
            }
        })
        .collect()
}

pub fn yield_records() -> Vec<CropYieldRecord> {
    (0..60)
        .map(|i| {
            let sowing = history_start().offset(i as i64);
            let duration = 3 + (i % 4) as i64;
            CropYieldRecord {
                crop: "maize.spring".into(),
                location_id: site(),
                sowing,
                harvest: sowing.offset(duration),
                yield_per_hectare: 4.0 + duration as f64 * 0.5 + (i % 3) as f64 * 0.1,
            }
        })
        .collect()
}

pub fn config() -> PipelineConfig {
    PipelineConfig {
        forecast: ForecastTrainingConfig {
            hidden_sizes: vec![6, 4],
            batch_size: 16,
            epochs: 2,
            ..ForecastTrainingConfig::default()
        },
        yield_training: YieldTrainingConfig {
            forest: ForestConfig {
                n_trees: 10,
                min_samples_split: 5,
                ..ForestConfig::default()
            },
            ..YieldTrainingConfig::default()
        },
        genetic: GeneticConfig {
            population_size: 10,
            generations: 4,
            ..GeneticConfig::default()
        },
        horizon_months: 24,
    }
}

pub struct World {
    pub planner: CropPlanner,
    pub crops: Arc<InMemoryCropCatalog>,
    pub yields: Arc<InMemoryYieldStore>,
    pub generative_models: Arc<InMemoryArtifactStore<GenerativeModelArtifact>>,
    pub yield_models: Arc<InMemoryArtifactStore<YieldModelArtifact>>,
}

pub fn world() -> World {
    let climate = Arc::new(InMemoryClimateStore::new());
    climate.insert_all(history()).unwrap();
    let drivers = Arc::new(InMemoryDriverStore::new());
    drivers.insert_all(drivers_at(10.0, 45.0, 280.0)).unwrap();
    drivers.insert_all(drivers_at(60.0, -10.0, 300.0)).unwrap();
    let locations = Arc::new(InMemoryLocationCatalog::new());
    locations
        .insert(Location {
            id: site(),
            country: "Italy".into(),
            name: "Po Valley".into(),
            longitude: 10.2,
            latitude: 44.9,
        })
        .unwrap();
    let crops = Arc::new(InMemoryCropCatalog::new());
    let yields = Arc::new(InMemoryYieldStore::new());
    let generative_models: Arc<InMemoryArtifactStore<GenerativeModelArtifact>> =
        Arc::new(InMemoryArtifactStore::new());
    let yield_models: Arc<InMemoryArtifactStore<YieldModelArtifact>> =
        Arc::new(InMemoryArtifactStore::new());

    let stores = Collaborators {
        climate,
        drivers,
        crops: crops.clone(),
        locations,
        yields: yields.clone(),
        generative_models: generative_models.clone(),
        yield_models: yield_models.clone(),
    };
    World {
        planner: CropPlanner::new(stores, config()).unwrap(),
        crops,
        yields,
        generative_models,
        yield_models,
    }
}
