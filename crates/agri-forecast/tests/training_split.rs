mod common;

use agri_core::YearMonth;
use agri_forecast::{train_forecaster, FeatureLayout, ForecastTrainingConfig, PeriodRange};
use common::{history, location, small_config};

#[test]
fn chronological_split_boundaries() {
    let start = YearMonth::new(2010, 1).unwrap();
    let records = history(start, 100);
    let artifact =
        train_forecaster(location(), &records, &FeatureLayout::default(), &small_config()).unwrap();

    let b = artifact.boundaries;
    assert_eq!(
        b.train,
        Some(PeriodRange {
            start,
            end: start.offset(69)
        })
    );
    assert_eq!(
        b.validation,
        Some(PeriodRange {
            start: start.offset(70),
            end: start.offset(84)
        })
    );
    assert_eq!(
        b.test,
        Some(PeriodRange {
            start: start.offset(85),
            end: start.offset(99)
        })
    );
    assert_eq!(artifact.summary().training_windows, 58);
    assert!(artifact.rmse.is_finite() && artifact.rmse >= 0.0);
}

#[test]
fn training_is_deterministic_for_a_seed() {
    let records = history(YearMonth::new(2010, 1).unwrap(), 100);
    let layout = FeatureLayout::default();
    let a = train_forecaster(location(), &records, &layout, &small_config()).unwrap();
    let b = train_forecaster(location(), &records, &layout, &small_config()).unwrap();
    assert_eq!(a.model, b.model);
    assert_eq!(a.rmse, b.rmse);

    let other = ForecastTrainingConfig {
        seed: 7,
        ..small_config()
    };
    let c = train_forecaster(location(), &records, &layout, &other).unwrap();
    assert_ne!(a.model, c.model);
}

#[test]
fn short_history_is_rejected() {
    let records = history(YearMonth::new(2010, 1).unwrap(), 40);
    let err = train_forecaster(location(), &records, &FeatureLayout::default(), &small_config())
        .unwrap_err();
    assert_eq!(err.info().code, "insufficient-history");
    assert!(!err.is_fatal());
}

#[test]
fn empty_history_is_not_found() {
    let err = train_forecaster(location(), &[], &FeatureLayout::default(), &small_config())
        .unwrap_err();
    assert!(matches!(err, agri_core::AgriError::NotFound(_)));
}

#[test]
fn early_stopping_keeps_a_valid_model() {
    let records = history(YearMonth::new(2010, 1).unwrap(), 100);
    let config = ForecastTrainingConfig {
        epochs: 6,
        patience: Some(1),
        ..small_config()
    };
    let artifact = train_forecaster(location(), &records, &FeatureLayout::default(), &config).unwrap();
    assert!(artifact.model.is_some());
    assert!(artifact.rmse.is_finite());
}

#[test]
fn artifact_survives_bincode() {
    let records = history(YearMonth::new(2010, 1).unwrap(), 100);
    let artifact =
        train_forecaster(location(), &records, &FeatureLayout::default(), &small_config()).unwrap();
    let bytes = bincode::serialize(&artifact).unwrap();
    let decoded: agri_forecast::GenerativeModelArtifact = bincode::deserialize(&bytes).unwrap();
    assert_eq!(decoded, artifact);
}

#[test]
fn invalid_config_is_rejected() {
    let records = history(YearMonth::new(2010, 1).unwrap(), 100);
    let config = ForecastTrainingConfig {
        hidden_sizes: Vec::new(),
        ..small_config()
    };
    let err = train_forecaster(location(), &records, &FeatureLayout::default(), &config).unwrap_err();
    assert_eq!(err.info().code, "forecast-config");
}
