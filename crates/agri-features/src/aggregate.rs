use agri_core::{AgriError, ClimateFrame, ErrorInfo};
use indexmap::IndexMap;

/// Insertion-ordered feature row keyed by column name.
pub type FeatureRow = IndexMap<String, f64>;

/// Summary statistic computed per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    /// Arithmetic mean.
    Mean,
    /// Sample standard deviation (n - 1).
    Std,
    /// Minimum.
    Min,
    /// Maximum.
    Max,
}

impl Stat {
    /// Every statistic in column order.
    pub const ALL: [Stat; 4] = [Stat::Mean, Stat::Std, Stat::Min, Stat::Max];

    /// Suffix used in the column name.
    pub fn suffix(self) -> &'static str {
        match self {
            Stat::Mean => "mean",
            Stat::Std => "std",
            Stat::Min => "min",
            Stat::Max => "max",
        }
    }
}

/// Column name `"{channel}_{stat}"`.
pub fn stat_column(channel: &str, stat: Stat) -> String {
    format!("{channel}_{}", stat.suffix())
}

/// Reduces a window to `{mean, std, min, max}` for every column not in `exclude`.
///
/// Columns keep the frame's order; statistics follow [`Stat::ALL`].
pub fn aggregate(frame: &ClimateFrame, exclude: &[&str]) -> Result<FeatureRow, AgriError> {
    if frame.is_empty() {
        return Err(AgriError::Validation(
            ErrorInfo::new("empty-window", "cannot aggregate an empty window")
                .with_context("columns", frame.columns().len()),
        ));
    }

    let mut row = FeatureRow::new();
    for (idx, column) in frame.columns().iter().enumerate() {
        if exclude.contains(&column.as_str()) {
            continue;
        }
        let values: Vec<f64> = frame.rows().iter().map(|r| r[idx]).collect();
        let summary = summarize(&values);
        for stat in Stat::ALL {
            let value = match stat {
                Stat::Mean => summary.mean,
                Stat::Std => summary.std,
                Stat::Min => summary.min,
                Stat::Max => summary.max,
            };
            row.insert(stat_column(column, stat), value);
        }
    }
    Ok(row)
}

struct Summary {
    mean: f64,
    std: f64,
    min: f64,
    max: f64,
}

fn summarize(values: &[f64]) -> Summary {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = if values.len() < 2 {
        0.0
    } else {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    };
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Summary {
        mean,
        std,
        min,
        max,
    }
}
