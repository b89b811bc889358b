#![deny(missing_docs)]
#![doc = "Summary statistics over climate windows, feature scaling and regression metrics."]

/// Window aggregation into `{channel}_{stat}` rows.
pub mod aggregate;
/// Regression quality metrics.
pub mod metrics;
/// Per-column standardization.
pub mod scaler;

pub use aggregate::{aggregate, stat_column, FeatureRow, Stat};
pub use metrics::{mse, r2, rmse};
pub use scaler::StandardScaler;
