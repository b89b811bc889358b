#![deny(missing_docs)]
#![doc = "Core data model, errors and collaborator contracts for crop schedule planning."]

pub mod calendar;
pub mod climate;
pub mod crop;
pub mod errors;
pub mod frame;
pub mod provenance;
pub mod rng;
pub mod store;

pub use calendar::{months_delta, YearMonth, MONTHS_PER_YEAR};
pub use climate::{
    Channel, ClimateRecord, DriverRecord, Location, LocationId, COS_YEAR, CYCLICAL_COLUMNS,
    SIN_YEAR,
};
pub use crop::{Crop, CropYieldRecord};
pub use errors::{AgriError, ErrorInfo};
pub use frame::ClimateFrame;
pub use provenance::{SchemaVersion, TrainingProvenance};
pub use rng::{derive_substream_seed, RngHandle};
pub use store::{
    ArtifactStore, ClimateRecordStore, CropCatalog, CropYieldStore, FutureDriverStore,
    LocationCatalog,
};
