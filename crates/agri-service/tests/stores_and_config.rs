use std::collections::BTreeMap;

use agri_core::{
    AgriError, Channel, ClimateRecord, ClimateRecordStore, CropYieldRecord, CropYieldStore,
    DriverRecord, FutureDriverStore, LocationId, YearMonth,
};
use agri_service::{InMemoryClimateStore, InMemoryDriverStore, InMemoryYieldStore, PipelineConfig};

fn ym(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).unwrap()
}

fn record(location: u64, period: YearMonth, value: f64) -> ClimateRecord {
    ClimateRecord::new(LocationId::from_raw(location), period, [value; Channel::COUNT])
}

#[test]
fn climate_store_orders_and_replaces_by_month() {
    let store = InMemoryClimateStore::new();
    let start = ym(2020, 11);
    store
        .insert_all((0..6).rev().map(|i| record(1, start.offset(i), i as f64)))
        .unwrap();
    store.insert_all([record(1, ym(2021, 1), 99.0), record(2, start, 0.0)]).unwrap();

    let history = store.history(LocationId::from_raw(1)).unwrap();
    assert_eq!(history.len(), 6);
    assert_eq!(history[0].period, ym(2020, 11));
    assert_eq!(history[2].values[0], 99.0);

    let window = store.window(LocationId::from_raw(1), ym(2020, 12), ym(2021, 2)).unwrap();
    let periods: Vec<_> = window.iter().map(|r| r.period).collect();
    assert_eq!(periods, vec![ym(2020, 12), ym(2021, 1), ym(2021, 2)]);
    assert!(store.window(LocationId::from_raw(1), ym(2021, 2), ym(2020, 12)).unwrap().is_empty());

    let recent = store.most_recent(LocationId::from_raw(1), 2).unwrap();
    assert_eq!(recent[0].period, ym(2021, 3));
    assert_eq!(recent[1].period, ym(2021, 4));
    assert!(store.history(LocationId::from_raw(3)).unwrap().is_empty());
}

fn driver(lon: f64, lat: f64, period: YearMonth, temperature: f64) -> DriverRecord {
    let mut values = BTreeMap::new();
    values.insert(Channel::Temperature2m, temperature);
    values.insert(Channel::TotalPrecipitation, 0.0);
    DriverRecord {
        period,
        longitude: lon,
        latitude: lat,
        values,
    }
}

#[test]
fn driver_store_picks_the_closest_grid_point() {
    let store = InMemoryDriverStore::new();
    match store.nearest(0.0, 0.0, ym(2030, 1), ym(2030, 3)) {
        Err(AgriError::NotFound(info)) => assert_eq!(info.code, "driver-projection"),
        other => panic!("expected NotFound, got {other:?}"),
    }
    store
        .insert_all([
            driver(0.0, 0.0, ym(2030, 2), 1.0),
            driver(0.0, 0.0, ym(2030, 1), 1.0),
            driver(5.0, 5.0, ym(2030, 1), 2.0),
            driver(5.0, 5.0, ym(2030, 4), 2.0),
        ])
        .unwrap();
    let near_origin = store.nearest(1.0, -1.0, ym(2030, 1), ym(2030, 3)).unwrap();
    assert_eq!(near_origin.len(), 2);
    assert_eq!(near_origin[0].period, ym(2030, 1));
    assert!(near_origin.iter().all(|r| r.longitude == 0.0));

    let far = store.nearest(4.0, 4.0, ym(2030, 1), ym(2030, 3)).unwrap();
    assert_eq!(far.len(), 1);
    assert_eq!(far[0].value(Channel::Temperature2m).unwrap(), 2.0);
}

#[test]
fn yield_store_groups_by_crop() {
    let store = InMemoryYieldStore::new();
    let base = CropYieldRecord {
        crop: "maize".into(),
        location_id: LocationId::from_raw(1),
        sowing: ym(2020, 3),
        harvest: ym(2020, 8),
        yield_per_hectare: 7.0,
    };
    let wheat = CropYieldRecord {
        crop: "wheat".into(),
        ..base.clone()
    };
    store.replace_all(vec![base.clone(), wheat, base.clone()]).unwrap();
    assert_eq!(store.records("maize").unwrap().len(), 2);
    assert_eq!(store.records("wheat").unwrap().len(), 1);
    store.replace_all(vec![base]).unwrap();
    assert!(store.records("wheat").unwrap().is_empty());
}

#[test]
fn yaml_config_fills_defaults() {
    let yaml = "
horizon_months: 12
genetic:
  population_size: 8
  workers: 2
yield:
  test_fraction: 0.25
forecast:
  hidden_sizes: [16]
";
    let config = PipelineConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.horizon_months, 12);
    assert_eq!(config.genetic.population_size, 8);
    assert_eq!(config.genetic.generations, 20);
    assert_eq!(config.yield_training.test_fraction, 0.25);
    assert_eq!(config.yield_training.forest.n_trees, 100);
    assert_eq!(config.forecast.hidden_sizes, vec![16]);
    assert_eq!(config.forecast.epochs, 50);

    assert_eq!(PipelineConfig::from_yaml_str("{}").unwrap(), PipelineConfig::default());
}

#[test]
fn invalid_config_is_rejected() {
    match PipelineConfig::from_yaml_str("horizon_months: 0") {
        Err(AgriError::Validation(info)) => assert_eq!(info.code, "pipeline-config"),
        other => panic!("expected Validation, got {other:?}"),
    }
    match PipelineConfig::from_yaml_str("genetic: [1, 2]") {
        Err(AgriError::Serde(info)) => assert_eq!(info.code, "config-parse"),
        other => panic!("expected Serde, got {other:?}"),
    }
    let dir = tempfile::tempdir().unwrap();
    match PipelineConfig::load(&dir.path().join("missing.yaml")) {
        Err(AgriError::Storage(info)) => assert_eq!(info.code, "config-read"),
        other => panic!("expected Storage, got {other:?}"),
    }
    let path = dir.path().join("pipeline.yaml");
    std::fs::write(&path, "genetic:\n  population_size: 7\n").unwrap();
    match PipelineConfig::load(&path) {
        Err(AgriError::Validation(info)) => {
            assert_eq!(info.code, "genetic-config");
            assert!(info.context.contains_key("path"));
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}
