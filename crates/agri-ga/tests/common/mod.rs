#![allow(dead_code)]

use agri_core::{Channel, ClimateFrame, Crop, YearMonth, COS_YEAR, SIN_YEAR};
use agri_ga::FitnessContext;
use agri_yield::{
    feature_names, train_yield_model, ForestConfig, YieldDataset, YieldModelArtifact,
    YieldTrainingConfig,
};
use chrono::Utc;

pub fn channels() -> Vec<Channel> {
    Channel::TARGETS
        .iter()
        .chain(Channel::DRIVERS.iter())
        .copied()
        .collect()
}

pub fn forecast(start: YearMonth, months: usize) -> ClimateFrame {
    let mut columns: Vec<String> = Channel::TARGETS.iter().map(|c| c.name().to_string()).collect();
    columns.push(SIN_YEAR.into());
    columns.push(COS_YEAR.into());
    columns.extend(Channel::DRIVERS.iter().map(|c| c.name().to_string()));
    let mut frame = ClimateFrame::new(columns);
    for i in 0..months {
        let period = start.offset(i as i64);
        let (sin, cos) = period.cyclical();
        let mut row: Vec<f64> = (0..Channel::TARGETS.len())
            .map(|c| c as f64 + (i as f64 * 0.7).sin())
            .collect();
        row.push(sin);
        row.push(cos);
        row.push(285.0 + 5.0 * sin);
        row.push(0.002 + 0.001 * cos);
        frame.push_row(period, row).unwrap();
    }
    frame
}

/// Aggregated feature the fixture yield responds to.
pub const YIELD_DRIVER: &str = "surface_solar_radiation_downwards_mean";

/// Yield model where yield grows linearly with [`YIELD_DRIVER`]; every other
/// feature is constant in training.
pub fn model() -> YieldModelArtifact {
    let names = feature_names(&channels());
    let driver = names.iter().position(|n| n == YIELD_DRIVER).unwrap();
    let rows: Vec<Vec<f64>> = (0..200)
        .map(|i| {
            let mut row = vec![0.0; names.len()];
            row[driver] = -1.0 + 3.0 * i as f64 / 199.0;
            row
        })
        .collect();
    let targets = rows.iter().map(|row| 10.0 + 3.0 * row[driver]).collect();
    let dataset = YieldDataset {
        feature_names: names,
        rows,
        targets,
    };
    let config = YieldTrainingConfig {
        forest: ForestConfig {
            n_trees: 20,
            min_samples_split: 2,
            ..ForestConfig::default()
        },
        ..YieldTrainingConfig::default()
    };
    train_yield_model("maize", &dataset, &config).unwrap()
}

pub fn crop(min: u32, max: u32) -> Crop {
    Crop {
        name: "maize".into(),
        created_at: Utc::now(),
        min_farming_months: min,
        max_farming_months: max,
    }
}

pub fn context() -> FitnessContext {
    FitnessContext::new(
        forecast(YearMonth::new(2025, 1).unwrap(), 24),
        crop(3, 6),
        model(),
    )
}
