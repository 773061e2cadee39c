//! Random forest classifier

use super::decision_tree::{Criterion, DecisionTree};
use crate::error::{Result, RookiecastError};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Bagged ensemble of decision trees with random feature subsets per split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    /// Number of trees
    pub n_estimators: usize,
    /// Features drawn at each split
    pub max_features: usize,
    /// Minimum samples in a leaf
    pub min_samples_leaf: usize,
    /// Minimum samples to split a node
    pub min_samples_split: usize,
    /// Maximum tree depth (unlimited when None)
    pub max_depth: Option<usize>,
    /// Impurity criterion
    pub criterion: Criterion,
    /// Base seed; tree i uses seed + i for its bootstrap and feature draws
    pub seed: u64,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
}

impl RandomForest {
    /// Create a forest with the given tree count
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_features: 4,
            min_samples_leaf: 1,
            min_samples_split: 2,
            max_depth: None,
            criterion: Criterion::Gini,
            seed: 42,
            n_features: 0,
            feature_importances: None,
        }
    }

    /// Set features drawn per split
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set minimum samples in a leaf
    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples;
        self
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set the base seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fit the forest: each tree trains on its own bootstrap sample
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(RookiecastError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if self.n_estimators == 0 {
            return Err(RookiecastError::ValidationError(
                "forest needs at least one tree".to_string(),
            ));
        }

        self.n_features = n_features;
        let max_features = self.max_features.clamp(1, n_features);
        let base_seed = self.seed;

        let trees: Vec<DecisionTree> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let seed = base_seed.wrapping_add(tree_idx as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);

                let sample_indices: Vec<usize> = (0..n_samples)
                    .map(|_| rng.gen_range(0..n_samples))
                    .collect();

                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot: Array1<f64> =
                    Array1::from_vec(sample_indices.iter().map(|&i| y[i]).collect());

                let mut tree = DecisionTree::new()
                    .with_min_samples_split(self.min_samples_split)
                    .with_min_samples_leaf(self.min_samples_leaf)
                    .with_max_features(max_features)
                    .with_criterion(self.criterion)
                    .with_seed(seed);
                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }

                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect::<Result<Vec<DecisionTree>>>()?;

        self.trees = trees;
        self.compute_feature_importances();

        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        if self.trees.is_empty() {
            return;
        }

        let mut total = vec![0.0; self.n_features];
        for tree in &self.trees {
            if let Some(imp) = tree.feature_importances() {
                for (slot, &val) in total.iter_mut().zip(imp.iter()) {
                    *slot += val;
                }
            }
        }

        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            for imp in &mut total {
                *imp /= sum;
            }
        }
        self.feature_importances = Some(Array1::from_vec(total));
    }

    /// Veteran-class probability per row: the fraction of trees voting 1
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(RookiecastError::ModelNotFitted);
        }

        let all_votes: Vec<Array1<f64>> = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let n_trees = all_votes.len() as f64;
        let probas: Vec<f64> = (0..x.nrows())
            .map(|i| all_votes.iter().map(|votes| votes[i]).sum::<f64>() / n_trees)
            .collect();

        Ok(Array1::from_vec(probas))
    }

    /// Predicted labels by majority vote
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    /// Impurity-decrease feature importances, averaged over trees
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Number of fitted trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean-decrease-in-accuracy importance on a held-out set.
    ///
    /// For each feature, its column is permuted `n_repeats` times and the
    /// average accuracy drop against the unpermuted baseline is recorded.
    pub fn permutation_importance(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        n_repeats: usize,
        seed: u64,
    ) -> Result<PermutationImportance> {
        if self.trees.is_empty() {
            return Err(RookiecastError::ModelNotFitted);
        }
        if n_repeats == 0 {
            return Err(RookiecastError::ValidationError(
                "n_repeats must be at least 1".to_string(),
            ));
        }

        let baseline = accuracy(&self.predict(x)?, y)?;
        let n_rows = x.nrows();

        let importances: Vec<f64> = (0..x.ncols())
            .into_par_iter()
            .map(|feature_idx| {
                let mut drop_sum = 0.0;
                for repeat in 0..n_repeats {
                    let mut rng = ChaCha8Rng::seed_from_u64(
                        seed.wrapping_add((feature_idx * n_repeats + repeat) as u64),
                    );
                    let mut order: Vec<usize> = (0..n_rows).collect();
                    order.shuffle(&mut rng);

                    let mut permuted = x.clone();
                    for (row, &src) in order.iter().enumerate() {
                        permuted[[row, feature_idx]] = x[[src, feature_idx]];
                    }

                    let permuted_accuracy = accuracy(&self.predict(&permuted)?, y)?;
                    drop_sum += baseline - permuted_accuracy;
                }
                Ok(drop_sum / n_repeats as f64)
            })
            .collect::<Result<Vec<f64>>>()?;

        Ok(PermutationImportance {
            baseline_accuracy: baseline,
            importances: Array1::from_vec(importances),
            n_repeats,
        })
    }
}

/// Result of a permutation-importance run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermutationImportance {
    /// Accuracy with no permutation applied
    pub baseline_accuracy: f64,
    /// Mean accuracy drop per feature
    pub importances: Array1<f64>,
    /// Permutation repeats averaged per feature
    pub n_repeats: usize,
}

impl PermutationImportance {
    /// Feature indices with their scores, most important first
    pub fn ranked(&self) -> Vec<(usize, f64)> {
        let mut pairs: Vec<(usize, f64)> = self
            .importances
            .iter()
            .copied()
            .enumerate()
            .collect();
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        pairs
    }
}

fn accuracy(y_pred: &Array1<f64>, y_true: &Array1<f64>) -> Result<f64> {
    if y_pred.len() != y_true.len() {
        return Err(RookiecastError::ShapeError {
            expected: format!("{} predictions", y_true.len()),
            actual: format!("{} predictions", y_pred.len()),
        });
    }
    let correct = y_pred
        .iter()
        .zip(y_true.iter())
        .filter(|(p, t)| (*p - *t).abs() < 0.5)
        .count();
    Ok(correct as f64 / y_true.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [0.0, 0.0],
            [0.1, 0.1],
            [0.2, 0.2],
            [0.3, 0.1],
            [1.0, 1.0],
            [1.1, 1.1],
            [1.2, 1.2],
            [1.3, 1.1],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_forest_learns_separable_data() {
        let (x, y) = separable_data();
        let mut forest = RandomForest::new(20).with_max_features(1).with_seed(42);
        forest.fit(&x, &y).unwrap();

        let predictions = forest.predict(&x).unwrap();
        let correct = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, a)| (*p - *a).abs() < 0.5)
            .count();
        assert!(correct >= 7, "only {} of 8 correct", correct);
    }

    #[test]
    fn test_same_seed_same_predictions() {
        let (x, y) = separable_data();

        let mut a = RandomForest::new(15).with_max_features(1).with_seed(7);
        a.fit(&x, &y).unwrap();
        let mut b = RandomForest::new(15).with_max_features(1).with_seed(7);
        b.fit(&x, &y).unwrap();

        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
        assert_eq!(
            a.feature_importances().unwrap(),
            b.feature_importances().unwrap()
        );
    }

    #[test]
    fn test_proba_is_vote_fraction() {
        let (x, y) = separable_data();
        let mut forest = RandomForest::new(10).with_seed(1);
        forest.fit(&x, &y).unwrap();

        let proba = forest.predict_proba(&x).unwrap();
        for &p in proba.iter() {
            assert!((0.0..=1.0).contains(&p));
            // Vote fractions over 10 trees are multiples of 0.1
            assert!((p * 10.0 - (p * 10.0).round()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_permutation_importance_finds_signal_feature() {
        // Only the first column carries label signal
        let x = Array2::from_shape_fn((40, 2), |(r, c)| {
            if c == 0 {
                if r < 20 { r as f64 * 0.1 } else { 10.0 + r as f64 * 0.1 }
            } else {
                (r % 5) as f64
            }
        });
        let y = Array1::from_shape_fn(40, |i| if i < 20 { 0.0 } else { 1.0 });

        let mut forest = RandomForest::new(20).with_max_features(1).with_seed(3);
        forest.fit(&x, &y).unwrap();

        let mda = forest.permutation_importance(&x, &y, 5, 3).unwrap();
        assert!(mda.importances[0] > mda.importances[1]);
        assert_eq!(mda.ranked()[0].0, 0);
    }

    #[test]
    fn test_unfitted_forest_errors() {
        let forest = RandomForest::new(5);
        assert!(matches!(
            forest.predict(&array![[1.0]]),
            Err(RookiecastError::ModelNotFitted)
        ));
    }
}
