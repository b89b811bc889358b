//! Small columnar table keyed by month, shared by the aggregator and the forecaster.

use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;
use crate::errors::{AgriError, ErrorInfo};

/// Chronological table of named `f64` columns, one row per month.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClimateFrame {
    columns: Vec<String>,
    periods: Vec<YearMonth>,
    rows: Vec<Vec<f64>>,
}

impl ClimateFrame {
    /// Creates an empty frame with the provided column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            periods: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Appends one row. The row width must match the column count.
    pub fn push_row(&mut self, period: YearMonth, values: Vec<f64>) -> Result<(), AgriError> {
        if values.len() != self.columns.len() {
            return Err(AgriError::Validation(
                ErrorInfo::new("frame-width", "row width does not match column count")
                    .with_context("expected", self.columns.len())
                    .with_context("actual", values.len())
                    .with_context("period", period),
            ));
        }
        self.periods.push(period);
        self.rows.push(values);
        Ok(())
    }

    /// Column names in storage order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Month of every row.
    pub fn periods(&self) -> &[YearMonth] {
        &self.periods
    }

    /// Row values in column order.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the frame holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Values of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Copy of the rows `from..=to` (by position).
    pub fn slice(&self, from: usize, to: usize) -> Result<ClimateFrame, AgriError> {
        if from > to || to >= self.rows.len() {
            return Err(AgriError::Validation(
                ErrorInfo::new("frame-slice", "slice bounds fall outside the frame")
                    .with_context("from", from)
                    .with_context("to", to)
                    .with_context("rows", self.rows.len()),
            ));
        }
        Ok(ClimateFrame {
            columns: self.columns.clone(),
            periods: self.periods[from..=to].to_vec(),
            rows: self.rows[from..=to].to_vec(),
        })
    }

    /// Whether every row is exactly one month after its predecessor.
    pub fn is_contiguous(&self) -> bool {
        self.periods
            .windows(2)
            .all(|pair| pair[1].follows(pair[0]))
    }
}
