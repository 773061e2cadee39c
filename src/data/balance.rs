//! Duplication-based class rebalancing

use crate::data::{class_indices, Dataset};
use crate::error::{Result, RookiecastError};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// Random oversampler: draws minority-class rows with replacement until
/// class counts match.
///
/// Every original row is kept unchanged and in place; the drawn
/// duplicates are appended after them. No synthetic (interpolated)
/// samples are generated.
#[derive(Debug, Clone)]
pub struct RandomOverSampler {
    seed: u64,
}

impl RandomOverSampler {
    /// Create a sampler with the given seed
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Produce a balanced dataset of size `2 * majority_count`
    pub fn resample(&self, dataset: &Dataset) -> Result<Dataset> {
        let by_class = class_indices(&dataset.y);
        if by_class.len() != 2 {
            return Err(RookiecastError::DataQualityError(format!(
                "oversampling requires exactly two classes, found {}",
                by_class.len()
            )));
        }

        let mut classes = by_class.iter();
        // class_indices is ordered, so destructuring is deterministic
        let (&class_a, idx_a) = classes.next().expect("two classes checked above");
        let (&class_b, idx_b) = classes.next().expect("two classes checked above");

        let (minority_class, minority_idx, majority_count) = if idx_a.len() < idx_b.len() {
            (class_a, idx_a, idx_b.len())
        } else {
            (class_b, idx_b, idx_a.len())
        };
        let n_to_add = majority_count - minority_idx.len();

        // All original rows first, drawn duplicates appended
        let mut indices: Vec<usize> = (0..dataset.n_rows()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        for _ in 0..n_to_add {
            indices.push(minority_idx[rng.gen_range(0..minority_idx.len())]);
        }

        info!(
            minority_class,
            duplicates = n_to_add,
            balanced_rows = indices.len(),
            "oversampled minority class to majority count"
        );

        Ok(dataset.select_rows(&indices))
    }
}
