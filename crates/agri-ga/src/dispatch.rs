use std::ops::Range;

use agri_core::{AgriError, ErrorInfo};
use rayon::prelude::*;

use crate::chromosome::Chromosome;
use crate::fitness::FitnessContext;

/// Splits `len` items into at most `workers` contiguous, near-equal ranges.
///
/// Earlier ranges take the remainder, so sizes differ by at most one.
pub fn chunk_bounds(len: usize, workers: usize) -> Vec<Range<usize>> {
    let chunks = workers.max(1).min(len.max(1));
    let base = len / chunks;
    let extra = len % chunks;
    let mut start = 0;
    (0..chunks)
        .map(|idx| {
            let size = base + usize::from(idx < extra);
            let range = start..start + size;
            start += size;
            range
        })
        .collect()
}

/// Evaluates populations either inline or on a dedicated thread pool.
pub struct FitnessPool {
    workers: usize,
    pool: Option<rayon::ThreadPool>,
}

impl FitnessPool {
    /// Builds the pool once per run; a single worker evaluates inline.
    pub fn new(workers: usize) -> Result<Self, AgriError> {
        let workers = workers.max(1);
        let pool = if workers == 1 {
            None
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()
                .map_err(|err| {
                    AgriError::Evaluation(
                        ErrorInfo::new("thread-pool", "failed to start fitness workers")
                            .with_context("workers", workers)
                            .with_context("reason", err),
                    )
                })?;
            Some(pool)
        };
        Ok(Self { workers, pool })
    }

    /// Number of workers.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Fitness of every individual, in population order.
    pub fn evaluate(
        &self,
        context: &FitnessContext,
        population: &[Chromosome],
    ) -> Result<Vec<f64>, AgriError> {
        let Some(pool) = &self.pool else {
            return evaluate_chunk(context, population);
        };
        let chunks = chunk_bounds(population.len(), self.workers);
        let results: Result<Vec<(usize, Vec<f64>)>, AgriError> = pool.install(|| {
            chunks
                .par_iter()
                .enumerate()
                .map(|(index, range)| {
                    let worker_context = context.clone();
                    let chunk = population[range.clone()].to_vec();
                    evaluate_chunk(&worker_context, &chunk).map(|scores| (index, scores))
                })
                .collect()
        });
        let mut ordered = results?;
        ordered.sort_by_key(|(index, _)| *index);
        Ok(ordered.into_iter().flat_map(|(_, scores)| scores).collect())
    }
}

fn evaluate_chunk(context: &FitnessContext, chunk: &[Chromosome]) -> Result<Vec<f64>, AgriError> {
    chunk.iter().map(|c| context.evaluate(c)).collect()
}
