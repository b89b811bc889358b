#![deny(missing_docs)]
#![doc = "Genetic search for the sowing/harvest month pair with the best predicted yield."]

/// Bit-vector schedule encoding.
pub mod chromosome;
/// Optimizer settings.
pub mod config;
/// Chunked population evaluation on a worker pool.
pub mod dispatch;
/// Scoring of one schedule against a forecast.
pub mod fitness;
/// Generational loop and ranking.
pub mod optimizer;

pub use chromosome::{Chromosome, CHROMOSOME_LENGTH, INDEX_BITS};
pub use config::GeneticConfig;
pub use dispatch::{chunk_bounds, FitnessPool};
pub use fitness::FitnessContext;
pub use optimizer::{optimize, rank_schedules, GenerationRecord, OptimizationReport, RankedSchedule};
