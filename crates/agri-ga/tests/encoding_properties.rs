use agri_core::RngHandle;
use agri_ga::{chunk_bounds, Chromosome, CHROMOSOME_LENGTH};
use proptest::prelude::*;

proptest! {
    #[test]
    fn indices_survive_encoding(sowing in 0usize..32, harvest in 0usize..32) {
        let chromosome = Chromosome::from_indices(sowing, harvest).unwrap();
        prop_assert_eq!(chromosome.bits().len(), CHROMOSOME_LENGTH);
        prop_assert_eq!(chromosome.decode(), (sowing, harvest));
    }

    #[test]
    fn crossover_keeps_every_bit_position(
        a in 0usize..32,
        b in 0usize..32,
        c in 0usize..32,
        d in 0usize..32,
        point in 1usize..CHROMOSOME_LENGTH,
    ) {
        let left = Chromosome::from_indices(a, b).unwrap();
        let right = Chromosome::from_indices(c, d).unwrap();
        let (x, y) = left.crossover(&right, point);
        for i in 0..CHROMOSOME_LENGTH {
            let (from_x, from_y) = if i < point {
                (left.bits()[i], right.bits()[i])
            } else {
                (right.bits()[i], left.bits()[i])
            };
            prop_assert_eq!(x.bits()[i], from_x);
            prop_assert_eq!(y.bits()[i], from_y);
        }
    }

    #[test]
    fn mutation_preserves_length(seed in any::<u64>(), rate in 0.0f64..=1.0) {
        let mut rng = RngHandle::from_seed(seed);
        let mut chromosome = Chromosome::random(&mut rng);
        chromosome.mutate(rate, &mut rng);
        prop_assert_eq!(chromosome.bits().len(), CHROMOSOME_LENGTH);
    }

    #[test]
    fn chunks_tile_the_population(len in 0usize..200, workers in 1usize..16) {
        let chunks = chunk_bounds(len, workers);
        prop_assert!(!chunks.is_empty());
        prop_assert!(chunks.len() <= workers);
        prop_assert_eq!(chunks[0].start, 0);
        prop_assert_eq!(chunks[chunks.len() - 1].end, len);
        for pair in chunks.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
        let sizes: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        let max = sizes.iter().copied().max().unwrap_or(0);
        let min = sizes.iter().copied().min().unwrap_or(0);
        prop_assert!(max - min <= 1);
    }
}
