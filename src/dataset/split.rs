//! Seeded random train/test partitioning.

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Row indices of each partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with `seed` and hold out `ceil(n * test_fraction)` rows.
///
/// The same `(n, test_fraction, seed)` always yields the same partition.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> SplitIndices {
    let n_test = ((n as f64) * test_fraction).ceil() as usize;
    let n_test = n_test.min(n);
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);
    let train = order.split_off(n_test);
    SplitIndices { train, test: order }
}
