use agri_core::{AgriError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Per-column standardization `(x - mean) / scale`.
///
/// Uses the population standard deviation. Constant columns get a scale of 1
/// so they map to zero instead of dividing by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Fits the scaler on row-major samples.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, AgriError> {
        let first = rows.first().ok_or_else(|| {
            AgriError::Training(ErrorInfo::new(
                "scaler-empty",
                "cannot fit a scaler without samples",
            ))
        })?;
        let width = first.len();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(AgriError::Training(
                ErrorInfo::new("scaler-width", "samples have inconsistent widths")
                    .with_context("row", idx)
                    .with_context("expected", width)
                    .with_context("actual", row.len()),
            ));
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0; width];
        for row in rows {
            for (acc, value) in mean.iter_mut().zip(row) {
                *acc += value;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut scale = vec![0.0; width];
        for row in rows {
            for ((acc, value), m) in scale.iter_mut().zip(row).zip(&mean) {
                *acc += (value - m).powi(2);
            }
        }
        for s in scale.iter_mut() {
            *s = (*s / n).sqrt();
            if *s == 0.0 || !s.is_finite() {
                *s = 1.0;
            }
        }
        Ok(Self { mean, scale })
    }

    /// Number of columns the scaler was fitted on.
    pub fn width(&self) -> usize {
        self.mean.len()
    }

    /// Fitted column means.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Fitted column scales.
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Standardizes one row.
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, AgriError> {
        self.check_width(row)?;
        Ok(row
            .iter()
            .zip(&self.mean)
            .zip(&self.scale)
            .map(|((x, m), s)| (x - m) / s)
            .collect())
    }

    /// Maps a standardized row back to original units.
    pub fn inverse_transform_row(&self, row: &[f64]) -> Result<Vec<f64>, AgriError> {
        self.check_width(row)?;
        Ok(row
            .iter()
            .zip(&self.mean)
            .zip(&self.scale)
            .map(|((z, m), s)| z * s + m)
            .collect())
    }

    /// Standardizes every row.
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, AgriError> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }

    /// Inverse of [`StandardScaler::transform`].
    pub fn inverse_transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, AgriError> {
        rows.iter().map(|row| self.inverse_transform_row(row)).collect()
    }

    fn check_width(&self, row: &[f64]) -> Result<(), AgriError> {
        if row.len() != self.mean.len() {
            return Err(AgriError::Validation(
                ErrorInfo::new("scaler-width", "row width does not match the fitted scaler")
                    .with_context("expected", self.mean.len())
                    .with_context("actual", row.len()),
            ));
        }
        Ok(())
    }
}
