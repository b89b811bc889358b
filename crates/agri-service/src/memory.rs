//! `RwLock<BTreeMap>` collaborators for tests, the CLI and embedding callers.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use agri_core::{
    AgriError, ArtifactStore, ClimateRecord, ClimateRecordStore, Crop, CropCatalog,
    CropYieldRecord, CropYieldStore, DriverRecord, ErrorInfo, FutureDriverStore, Location,
    LocationCatalog, LocationId, YearMonth,
};

fn read<'a, T>(lock: &'a RwLock<T>, store: &str) -> Result<RwLockReadGuard<'a, T>, AgriError> {
    lock.read().map_err(|_| {
        AgriError::Storage(
            ErrorInfo::new("lock-poisoned", "store lock poisoned by a panicked writer")
                .with_context("store", store),
        )
    })
}

fn write<'a, T>(lock: &'a RwLock<T>, store: &str) -> Result<RwLockWriteGuard<'a, T>, AgriError> {
    lock.write().map_err(|_| {
        AgriError::Storage(
            ErrorInfo::new("lock-poisoned", "store lock poisoned by a panicked writer")
                .with_context("store", store),
        )
    })
}

/// Observed climate keyed by location then month.
#[derive(Debug, Default)]
pub struct InMemoryClimateStore {
    records: RwLock<BTreeMap<LocationId, BTreeMap<YearMonth, ClimateRecord>>>,
}

impl InMemoryClimateStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts records; a record replaces any other with the same location and month.
    pub fn insert_all<I>(&self, records: I) -> Result<(), AgriError>
    where
        I: IntoIterator<Item = ClimateRecord>,
    {
        let mut guard = write(&self.records, "climate")?;
        for record in records {
            guard
                .entry(record.location_id)
                .or_default()
                .insert(record.period, record);
        }
        Ok(())
    }
}

impl ClimateRecordStore for InMemoryClimateStore {
    fn history(&self, location: LocationId) -> Result<Vec<ClimateRecord>, AgriError> {
        let guard = read(&self.records, "climate")?;
        Ok(guard
            .get(&location)
            .map(|months| months.values().cloned().collect())
            .unwrap_or_default())
    }

    fn window(
        &self,
        location: LocationId,
        from: YearMonth,
        to: YearMonth,
    ) -> Result<Vec<ClimateRecord>, AgriError> {
        if to < from {
            return Ok(Vec::new());
        }
        let guard = read(&self.records, "climate")?;
        Ok(guard
            .get(&location)
            .map(|months| months.range(from..=to).map(|(_, r)| r.clone()).collect())
            .unwrap_or_default())
    }

    fn most_recent(&self, location: LocationId, n: usize) -> Result<Vec<ClimateRecord>, AgriError> {
        let guard = read(&self.records, "climate")?;
        let Some(months) = guard.get(&location) else {
            return Ok(Vec::new());
        };
        let mut latest: Vec<ClimateRecord> = months.values().rev().take(n).cloned().collect();
        latest.reverse();
        Ok(latest)
    }
}

/// Projected drivers on a grid, matched to the nearest point by squared
/// coordinate distance.
#[derive(Debug, Default)]
pub struct InMemoryDriverStore {
    records: RwLock<Vec<DriverRecord>>,
}

impl InMemoryDriverStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends projections.
    pub fn insert_all<I>(&self, records: I) -> Result<(), AgriError>
    where
        I: IntoIterator<Item = DriverRecord>,
    {
        write(&self.records, "drivers")?.extend(records);
        Ok(())
    }
}

impl FutureDriverStore for InMemoryDriverStore {
    fn nearest(
        &self,
        longitude: f64,
        latitude: f64,
        from: YearMonth,
        to: YearMonth,
    ) -> Result<Vec<DriverRecord>, AgriError> {
        let guard = read(&self.records, "drivers")?;
        let distance = |r: &DriverRecord| {
            let dx = r.longitude - longitude;
            let dy = r.latitude - latitude;
            dx * dx + dy * dy
        };
        let Some(point) = guard.iter().min_by(|a, b| distance(a).total_cmp(&distance(b))) else {
            return Err(AgriError::NotFound(
                ErrorInfo::new("driver-projection", "no projected drivers available")
                    .with_context("longitude", longitude)
                    .with_context("latitude", latitude),
            ));
        };
        let (grid_lon, grid_lat) = (point.longitude, point.latitude);
        let mut matched: Vec<DriverRecord> = guard
            .iter()
            .filter(|r| r.longitude == grid_lon && r.latitude == grid_lat)
            .filter(|r| r.period >= from && r.period <= to)
            .cloned()
            .collect();
        matched.sort_by_key(|r| r.period);
        matched.dedup_by_key(|r| r.period);
        Ok(matched)
    }
}

/// Crops keyed by name.
#[derive(Debug, Default)]
pub struct InMemoryCropCatalog {
    crops: RwLock<BTreeMap<String, Crop>>,
}

impl InMemoryCropCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CropCatalog for InMemoryCropCatalog {
    fn get(&self, name: &str) -> Result<Option<Crop>, AgriError> {
        Ok(read(&self.crops, "crops")?.get(name).cloned())
    }

    fn list(&self) -> Result<Vec<Crop>, AgriError> {
        Ok(read(&self.crops, "crops")?.values().cloned().collect())
    }

    fn put(&self, crop: Crop) -> Result<(), AgriError> {
        write(&self.crops, "crops")?.insert(crop.name.clone(), crop);
        Ok(())
    }
}

/// Locations keyed by identifier.
#[derive(Debug, Default)]
pub struct InMemoryLocationCatalog {
    locations: RwLock<BTreeMap<LocationId, Location>>,
}

impl InMemoryLocationCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a location.
    pub fn insert(&self, location: Location) -> Result<(), AgriError> {
        write(&self.locations, "locations")?.insert(location.id, location);
        Ok(())
    }
}

impl LocationCatalog for InMemoryLocationCatalog {
    fn get(&self, id: LocationId) -> Result<Option<Location>, AgriError> {
        Ok(read(&self.locations, "locations")?.get(&id).cloned())
    }
}

/// Yield records grouped by crop.
#[derive(Debug, Default)]
pub struct InMemoryYieldStore {
    records: RwLock<BTreeMap<String, Vec<CropYieldRecord>>>,
}

impl InMemoryYieldStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every stored record and groups `records` by crop.
    pub fn replace_all(&self, records: Vec<CropYieldRecord>) -> Result<(), AgriError> {
        let mut grouped: BTreeMap<String, Vec<CropYieldRecord>> = BTreeMap::new();
        for record in records {
            grouped.entry(record.crop.clone()).or_default().push(record);
        }
        *write(&self.records, "yields")? = grouped;
        Ok(())
    }
}

impl CropYieldStore for InMemoryYieldStore {
    fn records(&self, crop: &str) -> Result<Vec<CropYieldRecord>, AgriError> {
        Ok(read(&self.records, "yields")?
            .get(crop)
            .cloned()
            .unwrap_or_default())
    }
}

/// Artifacts held by value; `get` hands out clones.
#[derive(Debug)]
pub struct InMemoryArtifactStore<A> {
    artifacts: RwLock<BTreeMap<String, A>>,
}

impl<A> Default for InMemoryArtifactStore<A> {
    fn default() -> Self {
        Self {
            artifacts: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<A> InMemoryArtifactStore<A> {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored keys in order.
    pub fn keys(&self) -> Result<Vec<String>, AgriError> {
        Ok(read(&self.artifacts, "artifacts")?.keys().cloned().collect())
    }
}

impl<A: Clone + Send + Sync> ArtifactStore<A> for InMemoryArtifactStore<A> {
    fn get(&self, key: &str) -> Result<Option<A>, AgriError> {
        Ok(read(&self.artifacts, "artifacts")?.get(key).cloned())
    }

    fn put(&self, key: &str, artifact: A) -> Result<(), AgriError> {
        let mut guard = write(&self.artifacts, "artifacts")?;
        guard.remove(key);
        guard.insert(key.to_string(), artifact);
        Ok(())
    }
}
