//! Climate channels, observed records and exogenous driver projections.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;
use crate::errors::{AgriError, ErrorInfo};

/// Column name of the sine half of the cyclical month encoding.
pub const SIN_YEAR: &str = "sin_year";
/// Column name of the cosine half of the cyclical month encoding.
pub const COS_YEAR: &str = "cos_year";
/// Both cyclical columns, in feature order.
pub const CYCLICAL_COLUMNS: [&str; 2] = [SIN_YEAR, COS_YEAR];

/// Identifier of a location whose climate is observed and forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocationId(u64);

impl LocationId {
    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named place with coordinates used to look up driver projections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Stable identifier.
    pub id: LocationId,
    /// Country name.
    pub country: String,
    /// Display name.
    pub name: String,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
}

/// Observed monthly climate channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Downward surface solar radiation.
    SurfaceSolarRadiationDownwards,
    /// Downward surface thermal radiation.
    SurfaceThermalRadiationDownwards,
    /// Net surface solar radiation.
    SurfaceNetSolarRadiation,
    /// Net surface thermal radiation.
    SurfaceNetThermalRadiation,
    /// Total cloud cover fraction.
    TotalCloudCover,
    /// Dewpoint temperature at two metres.
    #[serde(rename = "2m_dewpoint_temperature")]
    DewpointTemperature2m,
    /// Soil temperature, third layer.
    #[serde(rename = "soil_temperature_level_3")]
    SoilTemperatureLevel3,
    /// Volumetric soil water, third layer.
    #[serde(rename = "volumetric_soil_water_layer_3")]
    VolumetricSoilWaterLayer3,
    /// Air temperature at two metres.
    #[serde(rename = "2m_temperature")]
    Temperature2m,
    /// Total precipitation.
    TotalPrecipitation,
}

impl Channel {
    /// Number of channels stored on every [`ClimateRecord`].
    pub const COUNT: usize = 10;

    /// Every channel in storage order.
    pub const ALL: [Channel; Channel::COUNT] = [
        Channel::SurfaceSolarRadiationDownwards,
        Channel::SurfaceThermalRadiationDownwards,
        Channel::SurfaceNetSolarRadiation,
        Channel::SurfaceNetThermalRadiation,
        Channel::TotalCloudCover,
        Channel::DewpointTemperature2m,
        Channel::SoilTemperatureLevel3,
        Channel::VolumetricSoilWaterLayer3,
        Channel::Temperature2m,
        Channel::TotalPrecipitation,
    ];

    /// Channels the generative model learns to predict.
    pub const TARGETS: [Channel; 8] = [
        Channel::SurfaceSolarRadiationDownwards,
        Channel::SurfaceThermalRadiationDownwards,
        Channel::SurfaceNetSolarRadiation,
        Channel::SurfaceNetThermalRadiation,
        Channel::TotalCloudCover,
        Channel::DewpointTemperature2m,
        Channel::SoilTemperatureLevel3,
        Channel::VolumetricSoilWaterLayer3,
    ];

    /// Channels supplied by the external projection source.
    pub const DRIVERS: [Channel; 2] = [Channel::Temperature2m, Channel::TotalPrecipitation];

    /// Stable column name of the channel.
    pub fn name(self) -> &'static str {
        match self {
            Channel::SurfaceSolarRadiationDownwards => "surface_solar_radiation_downwards",
            Channel::SurfaceThermalRadiationDownwards => "surface_thermal_radiation_downwards",
            Channel::SurfaceNetSolarRadiation => "surface_net_solar_radiation",
            Channel::SurfaceNetThermalRadiation => "surface_net_thermal_radiation",
            Channel::TotalCloudCover => "total_cloud_cover",
            Channel::DewpointTemperature2m => "2m_dewpoint_temperature",
            Channel::SoilTemperatureLevel3 => "soil_temperature_level_3",
            Channel::VolumetricSoilWaterLayer3 => "volumetric_soil_water_layer_3",
            Channel::Temperature2m => "2m_temperature",
            Channel::TotalPrecipitation => "total_precipitation",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One observed month of climate at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateRecord {
    /// Location the observation belongs to.
    pub location_id: LocationId,
    /// Observed month.
    pub period: YearMonth,
    /// Channel values in [`Channel::ALL`] order.
    pub values: [f64; Channel::COUNT],
}

impl ClimateRecord {
    /// Creates a record from values ordered like [`Channel::ALL`].
    pub fn new(location_id: LocationId, period: YearMonth, values: [f64; Channel::COUNT]) -> Self {
        Self {
            location_id,
            period,
            values,
        }
    }

    /// Value of a single channel.
    pub fn value(&self, channel: Channel) -> f64 {
        self.values[channel.index()]
    }
}

/// Projected exogenous drivers for one month at one grid point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRecord {
    /// Projected month.
    pub period: YearMonth,
    /// Grid point longitude.
    pub longitude: f64,
    /// Grid point latitude.
    pub latitude: f64,
    /// Driver channel values.
    pub values: BTreeMap<Channel, f64>,
}

impl DriverRecord {
    /// Value of a driver channel; missing channels are a validation failure.
    pub fn value(&self, channel: Channel) -> Result<f64, AgriError> {
        self.values.get(&channel).copied().ok_or_else(|| {
            AgriError::Validation(
                ErrorInfo::new("missing-driver", "driver record lacks a required channel")
                    .with_context("channel", channel)
                    .with_context("period", self.period),
            )
        })
    }
}
