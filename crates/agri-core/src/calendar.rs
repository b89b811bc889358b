//! Year-month arithmetic used for windows, schedules and boundary checks.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{AgriError, ErrorInfo};

/// Number of months in the cyclical encoding period.
pub const MONTHS_PER_YEAR: u32 = 12;

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    /// Calendar year.
    pub year: i32,
    /// Calendar month in `1..=12`.
    pub month: u32,
}

impl YearMonth {
    /// Creates a validated year-month.
    pub fn new(year: i32, month: u32) -> Result<Self, AgriError> {
        if !(1..=MONTHS_PER_YEAR).contains(&month) {
            return Err(AgriError::Validation(
                ErrorInfo::new("invalid-month", "month must be within 1..=12")
                    .with_context("year", year)
                    .with_context("month", month),
            ));
        }
        Ok(Self { year, month })
    }

    /// The following calendar month, rolling December into January.
    pub fn next(self) -> Self {
        if self.month == MONTHS_PER_YEAR {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The calendar month `n` months after `self` (`n` may be negative).
    pub fn offset(self, n: i64) -> Self {
        let index = self.ordinal() + n;
        Self {
            year: index.div_euclid(12) as i32,
            month: (index.rem_euclid(12) + 1) as u32,
        }
    }

    /// Signed number of months from `self` to `later`.
    pub fn months_until(self, later: YearMonth) -> i64 {
        later.ordinal() - self.ordinal()
    }

    /// Whether `self` is exactly one calendar month after `previous`.
    pub fn follows(self, previous: YearMonth) -> bool {
        previous.next() == self
    }

    /// `(sin, cos)` of the month on a 12-month circle.
    pub fn cyclical(self) -> (f64, f64) {
        let angle = 2.0 * PI * f64::from(self.month) / f64::from(MONTHS_PER_YEAR);
        (angle.sin(), angle.cos())
    }

    fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Farming duration in months between sowing and harvest.
///
/// `(harvest_year - sowing_year) * 12 + (harvest_month - sowing_month)`; zero or
/// negative when the harvest does not come after the sowing.
pub fn months_delta(
    sowing_year: i32,
    sowing_month: u32,
    harvest_year: i32,
    harvest_month: u32,
) -> i64 {
    (i64::from(harvest_year) - i64::from(sowing_year)) * 12
        + (i64::from(harvest_month) - i64::from(sowing_month))
}
