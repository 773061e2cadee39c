//! Stratified splitting
//!
//! Both splitters shuffle within each class with a seeded generator and
//! visit classes in label order, so identical (data, fraction, seed)
//! always yields identical row membership.

use crate::data::{class_indices, Dataset};
use crate::error::{Result, RookiecastError};
use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A disjoint train/test partition of a dataset
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: Dataset,
    pub test: Dataset,
    /// Source-row indices that went to train, in assignment order
    pub train_indices: Vec<usize>,
    /// Source-row indices that went to test, in assignment order
    pub test_indices: Vec<usize>,
}

/// Stratified train/test partition.
///
/// Each class is shuffled independently and cut at
/// `round(fraction * class_size)`, so per-partition class ratios match
/// the source within one row of rounding.
pub fn train_test_split(
    dataset: &Dataset,
    train_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if !(train_fraction > 0.0 && train_fraction < 1.0) {
        return Err(RookiecastError::ValidationError(format!(
            "train fraction must be in (0, 1), got {}",
            train_fraction
        )));
    }

    let by_class = class_indices(&dataset.y);
    if by_class.len() < 2 {
        return Err(RookiecastError::DataQualityError(
            "stratified split requires both classes to be present".to_string(),
        ));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train_indices = Vec::new();
    let mut test_indices = Vec::new();

    for (class, indices) in &by_class {
        if indices.len() < 2 {
            return Err(RookiecastError::DataQualityError(format!(
                "class {} has fewer than two rows; cannot appear in both partitions",
                class
            )));
        }
        let mut shuffled = indices.clone();
        shuffled.shuffle(&mut rng);

        let n_train = ((shuffled.len() as f64) * train_fraction).round() as usize;
        // Keep at least one row of the class on each side
        let n_train = n_train.clamp(1, shuffled.len() - 1);

        train_indices.extend_from_slice(&shuffled[..n_train]);
        test_indices.extend_from_slice(&shuffled[n_train..]);
    }

    Ok(TrainTestSplit {
        train: dataset.select_rows(&train_indices),
        test: dataset.select_rows(&test_indices),
        train_indices,
        test_indices,
    })
}

/// A single fold of a k-fold partition
#[derive(Debug, Clone)]
pub struct FoldSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// Stratified K-Fold splitter, used internally by the penalized
/// logistic regressions to pick their penalty strength.
pub struct StratifiedKFold {
    n_splits: usize,
    seed: u64,
}

impl StratifiedKFold {
    /// Create a splitter with the given fold count and seed
    pub fn new(n_splits: usize, seed: u64) -> Self {
        Self { n_splits, seed }
    }

    /// Generate the folds for the given label vector
    pub fn split(&self, y: &Array1<f64>) -> Result<Vec<FoldSplit>> {
        if self.n_splits < 2 {
            return Err(RookiecastError::ValidationError(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if y.len() < self.n_splits {
            return Err(RookiecastError::ValidationError(format!(
                "n_samples ({}) must be >= n_splits ({})",
                y.len(),
                self.n_splits
            )));
        }

        let by_class = class_indices(y);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        // Round-robin each class's shuffled rows across folds
        let mut folds: Vec<Vec<usize>> = vec![Vec::new(); self.n_splits];
        for indices in by_class.values() {
            let mut shuffled = indices.clone();
            shuffled.shuffle(&mut rng);
            for (i, &idx) in shuffled.iter().enumerate() {
                folds[i % self.n_splits].push(idx);
            }
        }

        let splits = (0..self.n_splits)
            .map(|fold_idx| {
                let test_indices = folds[fold_idx].clone();
                let train_indices: Vec<usize> = folds
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != fold_idx)
                    .flat_map(|(_, f)| f.iter().copied())
                    .collect();
                FoldSplit {
                    train_indices,
                    test_indices,
                    fold_idx,
                }
            })
            .collect();

        Ok(splits)
    }
}
