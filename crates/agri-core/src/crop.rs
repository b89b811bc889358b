//! Crop catalogue entries and historical yield observations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;
use crate::climate::LocationId;

/// A catalogued crop with the farming-duration window observed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    /// Unique crop name.
    pub name: String,
    /// Time the catalogue entry was derived.
    pub created_at: DateTime<Utc>,
    /// Shortest observed sowing-to-harvest duration, in months.
    pub min_farming_months: u32,
    /// Longest observed sowing-to-harvest duration, in months.
    pub max_farming_months: u32,
}

impl Crop {
    /// Whether a duration in months falls inside `[min, max]`.
    pub fn accepts_duration(&self, months: i64) -> bool {
        months > 0
            && months >= i64::from(self.min_farming_months)
            && months <= i64::from(self.max_farming_months)
    }
}

/// One historical harvest: which crop was grown where, when, and how much it gave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropYieldRecord {
    /// Crop name.
    pub crop: String,
    /// Location the crop was grown at.
    pub location_id: LocationId,
    /// Sowing month.
    pub sowing: YearMonth,
    /// Harvest month.
    pub harvest: YearMonth,
    /// Yield per hectare.
    pub yield_per_hectare: f64,
}

impl CropYieldRecord {
    /// Sowing-to-harvest duration in months.
    pub fn duration_months(&self) -> i64 {
        self.sowing.months_until(self.harvest)
    }
}
