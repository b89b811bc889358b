use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use agri_core::{ClimateRecord, CropYieldRecord, DriverRecord, Location};
use agri_forecast::GenerativeModelArtifact;
use agri_service::{
    Collaborators, CropPlanner, FileArtifactStore, InMemoryClimateStore, InMemoryCropCatalog,
    InMemoryDriverStore, InMemoryLocationCatalog, InMemoryYieldStore, PipelineConfig,
};
use agri_yield::YieldModelArtifact;
use serde::{Deserialize, Serialize};

/// Everything the planner reads, as one JSON document.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub climate: Vec<ClimateRecord>,
    #[serde(default)]
    pub drivers: Vec<DriverRecord>,
    #[serde(default)]
    pub yields: Vec<CropYieldRecord>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let dataset = serde_json::from_str(&fs::read_to_string(path)?)?;
        Ok(dataset)
    }
}

pub struct Workspace {
    pub planner: CropPlanner,
    pub yields: Vec<CropYieldRecord>,
    yield_store: Arc<InMemoryYieldStore>,
}

impl Workspace {
    /// Loads the dataset into memory stores; trained models live under
    /// `artifacts/generative` and `artifacts/yield`.
    pub fn open(
        data: &Path,
        config: Option<&Path>,
        artifacts: &Path,
    ) -> Result<Self, Box<dyn Error>> {
        let dataset = Dataset::load(data)?;
        let config = match config {
            Some(path) => PipelineConfig::load(path)?,
            None => PipelineConfig::default(),
        };

        let climate = Arc::new(InMemoryClimateStore::new());
        climate.insert_all(dataset.climate)?;
        let drivers = Arc::new(InMemoryDriverStore::new());
        drivers.insert_all(dataset.drivers)?;
        let locations = Arc::new(InMemoryLocationCatalog::new());
        for location in dataset.locations {
            locations.insert(location)?;
        }
        let yield_store = Arc::new(InMemoryYieldStore::new());
        let generative: FileArtifactStore<GenerativeModelArtifact> =
            FileArtifactStore::open(artifacts.join("generative"))?;
        let yield_models: FileArtifactStore<YieldModelArtifact> =
            FileArtifactStore::open(artifacts.join("yield"))?;

        let stores = Collaborators {
            climate,
            drivers,
            crops: Arc::new(InMemoryCropCatalog::new()),
            locations,
            yields: yield_store.clone(),
            generative_models: Arc::new(generative),
            yield_models: Arc::new(yield_models),
        };
        Ok(Self {
            planner: CropPlanner::new(stores, config)?,
            yields: dataset.yields,
            yield_store,
        })
    }

    /// Cleans the raw yields, registers their crops and serves the cleaned
    /// records to the planner.
    pub async fn prepare(&self) -> Result<agri_service::PreparedCrops, Box<dyn Error>> {
        let prepared = self.planner.prepare_crops(self.yields.clone()).await?;
        self.yield_store.replace_all(prepared.records.clone())?;
        Ok(prepared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_default_to_empty() {
        let dataset: Dataset = serde_json::from_str(r#"{"locations": []}"#).unwrap();
        assert!(dataset.climate.is_empty());
        assert!(dataset.yields.is_empty());
    }

    #[tokio::test]
    async fn workspace_prepares_crops_from_raw_yields() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.json");
        let json = r#"{
            "yields": [
                {"crop": "rice.summer", "location_id": 1,
                 "sowing": {"year": 2020, "month": 4}, "harvest": {"year": 2020, "month": 9},
                 "yield_per_hectare": 6.5},
                {"crop": "rice", "location_id": 1,
                 "sowing": {"year": 2021, "month": 5}, "harvest": {"year": 2021, "month": 9},
                 "yield_per_hectare": 6.0}
            ]
        }"#;
        fs::write(&data, json).unwrap();
        let workspace = Workspace::open(&data, None, &dir.path().join("artifacts")).unwrap();
        let prepared = workspace.prepare().await.unwrap();
        assert_eq!(prepared.crops.len(), 1);
        assert_eq!(prepared.crops[0].name, "rice");
        assert_eq!(prepared.crops[0].min_farming_months, 4);
        assert_eq!(prepared.crops[0].max_farming_months, 5);
        assert!(dir.path().join("artifacts/generative").is_dir());
    }
}
