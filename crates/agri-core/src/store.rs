//! Narrow data-access contracts the planning pipeline consumes.
//!
//! Implementations live outside the core (databases, HTTP providers, files); the
//! pipeline only ever talks to these traits. All methods take `&self` so that a
//! single store can be shared behind an `Arc` between the caller and the
//! blocking worker that runs training or optimization.

use crate::calendar::YearMonth;
use crate::climate::{ClimateRecord, DriverRecord, Location, LocationId};
use crate::crop::{Crop, CropYieldRecord};
use crate::errors::AgriError;

/// Read access to observed monthly climate.
pub trait ClimateRecordStore: Send + Sync {
    /// Every record for the location in chronological order.
    fn history(&self, location: LocationId) -> Result<Vec<ClimateRecord>, AgriError>;

    /// Records in `from..=to`, chronological.
    fn window(
        &self,
        location: LocationId,
        from: YearMonth,
        to: YearMonth,
    ) -> Result<Vec<ClimateRecord>, AgriError>;

    /// The `n` latest records, returned oldest first.
    fn most_recent(&self, location: LocationId, n: usize) -> Result<Vec<ClimateRecord>, AgriError>;
}

/// Projected exogenous drivers on a spatial grid.
pub trait FutureDriverStore: Send + Sync {
    /// Records in `from..=to` for the grid point closest to the coordinates.
    fn nearest(
        &self,
        longitude: f64,
        latitude: f64,
        from: YearMonth,
        to: YearMonth,
    ) -> Result<Vec<DriverRecord>, AgriError>;
}

/// Crop lookup.
pub trait CropCatalog: Send + Sync {
    /// Crop by unique name.
    fn get(&self, name: &str) -> Result<Option<Crop>, AgriError>;

    /// Every crop ordered by name.
    fn list(&self) -> Result<Vec<Crop>, AgriError>;

    /// Inserts or replaces a crop.
    fn put(&self, crop: Crop) -> Result<(), AgriError>;
}

/// Location lookup.
pub trait LocationCatalog: Send + Sync {
    /// Location by identifier.
    fn get(&self, id: LocationId) -> Result<Option<Location>, AgriError>;
}

/// Historical crop yields.
pub trait CropYieldStore: Send + Sync {
    /// Every yield record for the crop.
    fn records(&self, crop: &str) -> Result<Vec<CropYieldRecord>, AgriError>;
}

/// Keyed storage for trained model artifacts.
///
/// `put` replaces any artifact under the same key. The pipeline assumes at most
/// one writer per key.
pub trait ArtifactStore<A>: Send + Sync {
    /// Artifact under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<A>, AgriError>;

    /// Stores `artifact` under `key`, deleting the previous one first.
    fn put(&self, key: &str, artifact: A) -> Result<(), AgriError>;
}
