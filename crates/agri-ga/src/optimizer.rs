use std::collections::HashMap;

use agri_core::{AgriError, ClimateFrame, ErrorInfo, RngHandle, YearMonth};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chromosome::{Chromosome, CHROMOSOME_LENGTH};
use crate::config::GeneticConfig;
use crate::dispatch::FitnessPool;
use crate::fitness::FitnessContext;

/// Best individual of one evaluated population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Generation number; 0 is the random initial population.
    pub generation: usize,
    /// Fittest individual (first one on ties).
    pub best: Chromosome,
    /// Its fitness.
    pub best_fitness: f64,
}

/// A recommended schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSchedule {
    /// Encoded candidate.
    pub chromosome: Chromosome,
    /// Index of the sowing month in the forecast.
    pub sowing_index: usize,
    /// Index of the harvest month in the forecast.
    pub harvest_index: usize,
    /// Sowing month.
    pub sowing: YearMonth,
    /// Harvest month.
    pub harvest: YearMonth,
    /// Months from sowing to harvest.
    pub duration_months: i64,
    /// Predicted yield.
    pub fitness: f64,
}

/// Result of one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    /// Best distinct schedules, fitness descending.
    pub top: Vec<RankedSchedule>,
    /// Best individual per generation.
    pub history: Vec<GenerationRecord>,
    /// Forecast the candidates were scored against.
    pub forecast: ClimateFrame,
}

/// Runs the generational search.
///
/// Every population, the random initial one included, is evaluated exactly
/// once; breeding reuses those scores. Any scoring failure aborts the run.
pub fn optimize(
    context: &FitnessContext,
    config: &GeneticConfig,
) -> Result<OptimizationReport, AgriError> {
    config.validate()?;
    let mut rng = RngHandle::from_seed(config.seed);
    let pool = FitnessPool::new(config.workers)?;

    let mut population: Vec<Chromosome> = (0..config.population_size)
        .map(|_| Chromosome::random(&mut rng))
        .collect();
    let mut fitness = pool.evaluate(context, &population)?;
    let mut history = vec![best_of(0, &population, &fitness)];

    for generation in 1..config.generations {
        population = breed(&population, &fitness, config, &mut rng)?;
        fitness = pool.evaluate(context, &population)?;
        let record = best_of(generation, &population, &fitness);
        debug!(
            generation,
            best = %record.best,
            best_fitness = record.best_fitness,
            "generation evaluated"
        );
        history.push(record);
    }

    let top = rank_schedules(context, &history, config.top_k);
    Ok(OptimizationReport {
        top,
        history,
        forecast: context.forecast().clone(),
    })
}

fn best_of(generation: usize, population: &[Chromosome], fitness: &[f64]) -> GenerationRecord {
    let mut best = 0;
    for (idx, score) in fitness.iter().enumerate() {
        if *score > fitness[best] {
            best = idx;
        }
    }
    GenerationRecord {
        generation,
        best: population[best].clone(),
        best_fitness: fitness[best],
    }
}

/// Roulette selection, single-point crossover and per-bit mutation.
fn breed(
    population: &[Chromosome],
    fitness: &[f64],
    config: &GeneticConfig,
    rng: &mut RngHandle,
) -> Result<Vec<Chromosome>, AgriError> {
    let total: f64 = fitness.iter().sum();
    let roulette = if total > 0.0 {
        let weights = WeightedIndex::new(fitness).map_err(|err| {
            AgriError::Evaluation(
                ErrorInfo::new("selection", "fitness values cannot drive roulette selection")
                    .with_context("reason", err),
            )
        })?;
        Some(weights)
    } else {
        None
    };
    let pick = |rng: &mut RngHandle| match &roulette {
        Some(weights) => weights.sample(rng.inner_mut()),
        None => rng.inner_mut().gen_range(0..population.len()),
    };

    let mut next = Vec::with_capacity(population.len());
    while next.len() < population.len() {
        let first = &population[pick(&mut *rng)];
        let second = &population[pick(&mut *rng)];
        let (mut a, mut b) = if rng.chance(config.crossover_rate) {
            let point = rng.inner_mut().gen_range(1..CHROMOSOME_LENGTH);
            first.crossover(second, point)
        } else {
            (first.clone(), second.clone())
        };
        a.mutate(config.mutation_rate, rng);
        b.mutate(config.mutation_rate, rng);
        next.push(a);
        next.push(b);
    }
    Ok(next)
}

/// Distinct feasible schedules from the generation history, fitness descending.
///
/// Candidates decoding to the same month pair keep their highest fitness; ties
/// keep the order in which they were first seen.
pub fn rank_schedules(
    context: &FitnessContext,
    history: &[GenerationRecord],
    top_k: usize,
) -> Vec<RankedSchedule> {
    let mut ranked: Vec<RankedSchedule> = Vec::new();
    let mut seen: HashMap<(usize, usize), usize> = HashMap::new();
    for record in history {
        if !context.is_feasible(&record.best) {
            continue;
        }
        let Some((sowing, harvest)) = context.schedule(&record.best) else {
            continue;
        };
        let (sowing_index, harvest_index) = record.best.decode();
        match seen.get(&(sowing_index, harvest_index)) {
            Some(&slot) => {
                if record.best_fitness > ranked[slot].fitness {
                    ranked[slot].fitness = record.best_fitness;
                    ranked[slot].chromosome = record.best.clone();
                }
            }
            None => {
                seen.insert((sowing_index, harvest_index), ranked.len());
                ranked.push(RankedSchedule {
                    chromosome: record.best.clone(),
                    sowing_index,
                    harvest_index,
                    sowing,
                    harvest,
                    duration_months: sowing.months_until(harvest),
                    fitness: record.best_fitness,
                });
            }
        }
    }
    ranked.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
    ranked.truncate(top_k);
    ranked
}
