//! Data preparation module
//!
//! Provides the artifacts the pipeline threads forward:
//! - CSV/TSV ingestion
//! - Cleaning, schema validation, column removal
//! - Stratified train/test splitting and k-fold splitting
//! - Z-score standardization
//! - Duplication-based class rebalancing

mod loader;
mod prepare;
mod scaler;
pub mod balance;
pub mod split;

pub use balance::RandomOverSampler;
pub use loader::DataLoader;
pub use prepare::DatasetPreparer;
pub use scaler::StandardScaler;
pub use split::{train_test_split, FoldSplit, StratifiedKFold, TrainTestSplit};

use crate::error::{Result, RookiecastError};
use ndarray::{Array1, Array2, Axis};
use std::collections::BTreeMap;

/// A cleaned, fully numeric dataset: predictors, binary labels, column names.
///
/// Immutable once built; every transformation (split, scale, resample)
/// produces a new `Dataset` and leaves its input untouched.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Predictor matrix, one row per player
    pub x: Array2<f64>,
    /// Labels, 0.0 or 1.0
    pub y: Array1<f64>,
    /// Predictor column names, in matrix order
    pub feature_names: Vec<String>,
}

impl Dataset {
    /// Build a dataset, validating that shapes line up and labels are binary
    pub fn new(x: Array2<f64>, y: Array1<f64>, feature_names: Vec<String>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(RookiecastError::ShapeError {
                expected: format!("{} labels", x.nrows()),
                actual: format!("{} labels", y.len()),
            });
        }
        if x.ncols() != feature_names.len() {
            return Err(RookiecastError::ShapeError {
                expected: format!("{} feature names", x.ncols()),
                actual: format!("{} feature names", feature_names.len()),
            });
        }
        if let Some(bad) = y.iter().find(|&&v| v != 0.0 && v != 1.0) {
            return Err(RookiecastError::ValidationError(format!(
                "label value {} outside {{0, 1}}",
                bad
            )));
        }
        Ok(Self {
            x,
            y,
            feature_names,
        })
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.x.nrows()
    }

    /// Number of predictor columns
    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// New dataset containing the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let x = self.x.select(Axis(0), indices);
        let y = Array1::from_vec(indices.iter().map(|&i| self.y[i]).collect());
        Self {
            x,
            y,
            feature_names: self.feature_names.clone(),
        }
    }

    /// New dataset with the predictor matrix replaced (e.g. after scaling)
    pub fn with_features(&self, x: Array2<f64>) -> Result<Self> {
        Self::new(x, self.y.clone(), self.feature_names.clone())
    }

    /// Per-class row counts, keyed by label
    pub fn class_counts(&self) -> BTreeMap<i64, usize> {
        class_counts(&self.y)
    }
}

/// Per-class row counts. Keys are ordered so iteration is deterministic.
pub fn class_counts(y: &Array1<f64>) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for &label in y.iter() {
        *counts.entry(label.round() as i64).or_insert(0) += 1;
    }
    counts
}

/// Row indices per class, in original row order. Keys ordered for determinism.
pub fn class_indices(y: &Array1<f64>) -> BTreeMap<i64, Vec<usize>> {
    let mut indices = BTreeMap::new();
    for (i, &label) in y.iter().enumerate() {
        indices
            .entry(label.round() as i64)
            .or_insert_with(Vec::new)
            .push(i);
    }
    indices
}
