use agri_core::{AgriError, Channel, ClimateFrame, ClimateRecord, ErrorInfo, YearMonth};
use agri_features::{stat_column, FeatureRow, Stat};

/// Scalar schedule features, in row order.
pub const SCHEDULE_FEATURES: [&str; 5] = [
    "sowing_year",
    "sowing_month",
    "harvest_year",
    "harvest_month",
    "duration_months",
];

/// Full feature order: schedule features then `{channel}_{stat}` per channel.
pub fn feature_names(channels: &[Channel]) -> Vec<String> {
    let mut names: Vec<String> = SCHEDULE_FEATURES.iter().map(|s| s.to_string()).collect();
    for channel in channels {
        for stat in Stat::ALL {
            names.push(stat_column(channel.name(), stat));
        }
    }
    names
}

/// Frame of observed records restricted to `channels`.
pub fn observed_frame(
    records: &[ClimateRecord],
    channels: &[Channel],
) -> Result<ClimateFrame, AgriError> {
    let mut frame = ClimateFrame::new(channels.iter().map(|c| c.name()));
    for record in records {
        frame.push_row(record.period, channels.iter().map(|c| record.value(*c)).collect())?;
    }
    Ok(frame)
}

/// Selects `names` from the schedule features and aggregated statistics.
pub fn assemble_row(
    names: &[String],
    sowing: YearMonth,
    harvest: YearMonth,
    stats: &FeatureRow,
) -> Result<Vec<f64>, AgriError> {
    let schedule = [
        f64::from(sowing.year),
        f64::from(sowing.month),
        f64::from(harvest.year),
        f64::from(harvest.month),
        sowing.months_until(harvest) as f64,
    ];
    names
        .iter()
        .map(|name| {
            if let Some(idx) = SCHEDULE_FEATURES.iter().position(|s| *s == name.as_str()) {
                return Ok(schedule[idx]);
            }
            stats.get(name).copied().ok_or_else(|| {
                AgriError::Evaluation(
                    ErrorInfo::new("missing-feature", "aggregated window lacks a model feature")
                        .with_context("feature", name),
                )
            })
        })
        .collect()
}
