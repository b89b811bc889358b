use agri_core::{AgriError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// Genetic search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Individuals per generation; must be even.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Number of populations evaluated, the initial one included.
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Per-bit flip probability.
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Probability that a bred pair exchanges tails.
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f64,
    /// Fitness workers; 1 evaluates on the calling thread.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Number of ranked schedules returned.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Seed of the run.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_population_size() -> usize {
    20
}

fn default_generations() -> usize {
    20
}

fn default_mutation_rate() -> f64 {
    0.01
}

fn default_crossover_rate() -> f64 {
    0.7
}

fn default_workers() -> usize {
    1
}

fn default_top_k() -> usize {
    3
}

fn default_seed() -> u64 {
    42
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            generations: default_generations(),
            mutation_rate: default_mutation_rate(),
            crossover_rate: default_crossover_rate(),
            workers: default_workers(),
            top_k: default_top_k(),
            seed: default_seed(),
        }
    }
}

impl GeneticConfig {
    /// Rejects settings the generational loop cannot run with.
    pub fn validate(&self) -> Result<(), AgriError> {
        let invalid = |field: &str, value: String| -> Result<(), AgriError> {
            Err(AgriError::Validation(
                ErrorInfo::new("genetic-config", "invalid genetic search setting")
                    .with_context("field", field)
                    .with_context("value", value),
            ))
        };
        if self.population_size < 2 || self.population_size % 2 != 0 {
            return invalid("population_size", self.population_size.to_string());
        }
        if self.generations < 2 {
            return invalid("generations", self.generations.to_string());
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return invalid("mutation_rate", self.mutation_rate.to_string());
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return invalid("crossover_rate", self.crossover_rate.to_string());
        }
        if self.workers == 0 {
            return invalid("workers", "0".into());
        }
        if self.top_k == 0 {
            return invalid("top_k", "0".into());
        }
        Ok(())
    }
}
