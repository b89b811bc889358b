#![allow(dead_code)]

use std::collections::BTreeMap;

use agri_core::{Channel, ClimateRecord, DriverRecord, LocationId, YearMonth};
use agri_forecast::ForecastTrainingConfig;

pub fn location() -> LocationId {
    LocationId::from_raw(1)
}

pub fn history(start: YearMonth, months: usize) -> Vec<ClimateRecord> {
    (0..months)
        .map(|i| {
            let period = start.offset(i as i64);
            let phase = f64::from(period.month) / 12.0 * std::f64::consts::TAU;
            let mut values = [0.0; Channel::COUNT];
            for (idx, value) in values.iter_mut().enumerate() {
                *value = 10.0 * (idx as f64 + 1.0) + (phase + idx as f64).sin() * 3.0;
            }
            ClimateRecord::new(location(), period, values)
        })
        .collect()
}

pub fn drivers(start: YearMonth, months: usize) -> Vec<DriverRecord> {
    (0..months)
        .map(|i| {
            let period = start.offset(i as i64);
            let mut values = BTreeMap::new();
            values.insert(Channel::Temperature2m, 280.0 + i as f64);
            values.insert(Channel::TotalPrecipitation, 0.001 * i as f64);
            DriverRecord {
                period,
                longitude: 0.0,
                latitude: 0.0,
                values,
            }
        })
        .collect()
}

pub fn small_config() -> ForecastTrainingConfig {
    ForecastTrainingConfig {
        hidden_sizes: vec![6, 4],
        batch_size: 8,
        epochs: 3,
        ..ForecastTrainingConfig::default()
    }
}
