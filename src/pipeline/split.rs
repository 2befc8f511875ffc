//! Seeded train/test partitioning

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::error::{FraudError, FraudResult};

/// Row indices for the two partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..rows` with a seeded RNG and hold out `ceil(rows * test_fraction)`
/// rows for evaluation.
///
/// The same `(rows, test_fraction, seed)` always yields the same partition.
pub fn train_test_split(rows: usize, test_fraction: f64, seed: u64) -> FraudResult<TrainTestSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(FraudError::InvalidData(format!(
            "test fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }

    let test_rows = (rows as f64 * test_fraction).ceil() as usize;
    if test_rows == 0 || test_rows >= rows {
        return Err(FraudError::InvalidData(format!(
            "{} rows cannot be split into non-empty train and test partitions",
            rows
        )));
    }

    let mut indices: Vec<usize> = (0..rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(test_rows);
    Ok(TrainTestSplit {
        train,
        test: indices,
    })
}

/// Select items by index
pub fn take<T: Clone>(items: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| items[i].clone()).collect()
}
