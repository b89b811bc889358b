use std::fmt;

use agri_core::{AgriError, ErrorInfo, RngHandle};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Bits per decoded index.
pub const INDEX_BITS: usize = 5;
/// Total bits of a schedule chromosome.
pub const CHROMOSOME_LENGTH: usize = 2 * INDEX_BITS;

/// Candidate schedule: bits `0..5` encode the sowing index and bits `5..10` the
/// harvest index, least-significant bit first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chromosome {
    bits: Vec<bool>,
}

impl Chromosome {
    /// Wraps a bit vector, rejecting any length other than [`CHROMOSOME_LENGTH`].
    pub fn new(bits: Vec<bool>) -> Result<Self, AgriError> {
        if bits.len() != CHROMOSOME_LENGTH {
            return Err(AgriError::Validation(
                ErrorInfo::new("chromosome-length", "chromosome must hold exactly 10 bits")
                    .with_context("actual", bits.len()),
            ));
        }
        Ok(Self { bits })
    }

    /// Encodes a sowing and harvest index pair; both must fit in five bits.
    pub fn from_indices(sowing: usize, harvest: usize) -> Result<Self, AgriError> {
        let limit = 1usize << INDEX_BITS;
        if sowing >= limit || harvest >= limit {
            return Err(AgriError::Validation(
                ErrorInfo::new("index-range", "schedule index does not fit in five bits")
                    .with_context("sowing", sowing)
                    .with_context("harvest", harvest),
            ));
        }
        let bits = (0..INDEX_BITS)
            .map(|i| (sowing >> i) & 1 == 1)
            .chain((0..INDEX_BITS).map(|i| (harvest >> i) & 1 == 1))
            .collect();
        Ok(Self { bits })
    }

    /// Uniformly random chromosome.
    pub fn random(rng: &mut RngHandle) -> Self {
        let bits = (0..CHROMOSOME_LENGTH)
            .map(|_| rng.inner_mut().gen_bool(0.5))
            .collect();
        Self { bits }
    }

    /// Raw bits.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// `(sowing_index, harvest_index)`.
    pub fn decode(&self) -> (usize, usize) {
        let (sowing, harvest) = self.bits.split_at(INDEX_BITS);
        (decode_half(sowing), decode_half(harvest))
    }

    /// Single-point crossover at `point`; children swap tails.
    pub fn crossover(&self, other: &Self, point: usize) -> (Self, Self) {
        let mut first = self.bits[..point].to_vec();
        first.extend_from_slice(&other.bits[point..]);
        let mut second = other.bits[..point].to_vec();
        second.extend_from_slice(&self.bits[point..]);
        (Self { bits: first }, Self { bits: second })
    }

    /// Flips every bit independently with probability `rate`.
    pub fn mutate(&mut self, rate: f64, rng: &mut RngHandle) {
        for bit in self.bits.iter_mut() {
            if rng.chance(rate) {
                *bit = !*bit;
            }
        }
    }
}

fn decode_half(bits: &[bool]) -> usize {
    bits.iter()
        .enumerate()
        .filter(|(_, bit)| **bit)
        .map(|(i, _)| 1usize << i)
        .sum()
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.bits {
            f.write_str(if *bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}
