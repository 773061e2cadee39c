//! Logistic regression family (plain, ridge, lasso)

use crate::data::split::StratifiedKFold;
use crate::error::{Result, RookiecastError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Coefficient penalty applied during fitting
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Penalty {
    /// Plain maximum likelihood
    None,
    /// L2: shrinks all coefficients toward zero
    Ridge(f64),
    /// L1: drives some coefficients exactly to zero
    Lasso(f64),
}

/// Binary logistic regression fit by gradient descent.
/// The L1 variant uses a proximal soft-threshold step; the intercept is
/// never penalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Fitted coefficients
    pub coefficients: Option<Array1<f64>>,
    /// Fitted intercept
    pub intercept: Option<f64>,
    /// Penalty in effect
    pub penalty: Penalty,
    /// Maximum gradient-descent iterations
    pub max_iter: usize,
    /// Convergence tolerance on the parameter update
    pub tol: f64,
    /// Learning rate
    pub learning_rate: f64,
    /// Whether the model is fitted
    pub is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create an unpenalized model
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            penalty: Penalty::None,
            max_iter: 1000,
            tol: 1e-6,
            learning_rate: 0.1,
            is_fitted: false,
        }
    }

    /// Set the penalty
    pub fn with_penalty(mut self, penalty: Penalty) -> Self {
        self.penalty = penalty;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set learning rate
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }

    /// Soft-threshold operator for the L1 proximal step
    fn soft_threshold(val: f64, threshold: f64) -> f64 {
        if val > threshold {
            val - threshold
        } else if val < -threshold {
            val + threshold
        } else {
            0.0
        }
    }

    /// Fit on (scaled) features and binary labels
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(RookiecastError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if let Some(bad) = y.iter().find(|&&v| v != 0.0 && v != 1.0) {
            return Err(RookiecastError::ValidationError(format!(
                "label value {} outside {{0, 1}}",
                bad
            )));
        }

        let mut weights: Array1<f64> = Array1::zeros(n_features);
        let mut bias = 0.0;
        let lr = self.learning_rate;

        for _iter in 0..self.max_iter {
            let linear = x.dot(&weights) + bias;
            let predictions = Self::sigmoid(&linear);

            let errors = &predictions - y;
            let grad = x.t().dot(&errors) / n_samples as f64;
            let db = errors.mean().unwrap_or(0.0);

            let new_weights = match self.penalty {
                Penalty::None => &weights - &(lr * &grad),
                Penalty::Ridge(alpha) => &weights - &(lr * (&grad + &(alpha * &weights))),
                Penalty::Lasso(alpha) => {
                    let stepped = &weights - &(lr * &grad);
                    stepped.mapv(|w| Self::soft_threshold(w, lr * alpha))
                }
            };
            let new_bias = bias - lr * db;

            let delta = (&new_weights - &weights).mapv(f64::abs).sum()
                + (new_bias - bias).abs();
            weights = new_weights;
            bias = new_bias;

            if delta < self.tol {
                break;
            }
        }

        self.coefficients = Some(weights);
        self.intercept = Some(bias);
        self.is_fitted = true;

        Ok(self)
    }

    /// Veteran-class probability per row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or(RookiecastError::ModelNotFitted)?;
        if x.ncols() != coefficients.len() {
            return Err(RookiecastError::ShapeError {
                expected: format!("{} columns", coefficients.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let linear = x.dot(coefficients) + self.intercept.unwrap_or(0.0);
        Ok(Self::sigmoid(&linear))
    }

    /// Predicted labels at a 0.5 threshold
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    /// Number of exactly-zero coefficients (lasso's embedded selection)
    pub fn n_zero_coefficients(&self) -> usize {
        self.coefficients
            .as_ref()
            .map_or(0, |w| w.iter().filter(|&&v| v == 0.0).count())
    }
}

/// Mean binomial deviance of probabilities against binary labels
pub fn binomial_deviance(y_true: &Array1<f64>, proba: &Array1<f64>) -> Result<f64> {
    if y_true.len() != proba.len() {
        return Err(RookiecastError::ShapeError {
            expected: format!("{} probabilities", y_true.len()),
            actual: format!("{} probabilities", proba.len()),
        });
    }
    let n = y_true.len() as f64;
    let sum: f64 = y_true
        .iter()
        .zip(proba.iter())
        .map(|(&y, &p)| {
            let p = p.clamp(1e-12, 1.0 - 1e-12);
            y * p.ln() + (1.0 - y) * (1.0 - p).ln()
        })
        .sum();
    Ok(-2.0 * sum / n)
}

/// Which penalized variant a cross-validated fit selects for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum PenaltyKind {
    Ridge,
    Lasso,
}

impl PenaltyKind {
    fn penalty(&self, strength: f64) -> Penalty {
        match self {
            PenaltyKind::Ridge => Penalty::Ridge(strength),
            PenaltyKind::Lasso => Penalty::Lasso(strength),
        }
    }
}

/// Outcome of the penalty-strength search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PenaltySelection {
    /// Strength with the lowest mean held-out deviance
    pub chosen: f64,
    /// Its mean held-out deviance
    pub mean_deviance: f64,
    /// (strength, mean deviance) for the whole grid, in grid order
    pub grid_deviances: Vec<(f64, f64)>,
}

/// Penalized logistic regression with internal stratified
/// cross-validation over a penalty grid, minimizing held-out deviance.
#[derive(Debug, Clone)]
pub struct LogisticRegressionCv {
    kind: PenaltyKind,
    grid: Vec<f64>,
    n_folds: usize,
    seed: u64,
    max_iter: usize,
    learning_rate: f64,
}

impl LogisticRegressionCv {
    /// Create a cross-validated trainer for the given penalty kind
    pub fn new(kind: PenaltyKind, grid: Vec<f64>, n_folds: usize, seed: u64) -> Self {
        Self {
            kind,
            grid,
            n_folds,
            seed,
            max_iter: 1000,
            learning_rate: 0.1,
        }
    }

    /// Set maximum iterations for each inner fit
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Select the penalty strength, then refit on all rows
    pub fn fit(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<(LogisticRegression, PenaltySelection)> {
        if self.grid.is_empty() {
            return Err(RookiecastError::ValidationError(
                "penalty grid is empty".to_string(),
            ));
        }

        let folds = StratifiedKFold::new(self.n_folds, self.seed).split(y)?;

        let mut grid_deviances = Vec::with_capacity(self.grid.len());
        for &strength in &self.grid {
            let mut fold_deviances = Vec::with_capacity(folds.len());
            for fold in &folds {
                let x_train = x.select(Axis(0), &fold.train_indices);
                let y_train: Array1<f64> =
                    Array1::from_vec(fold.train_indices.iter().map(|&i| y[i]).collect());
                let x_test = x.select(Axis(0), &fold.test_indices);
                let y_test: Array1<f64> =
                    Array1::from_vec(fold.test_indices.iter().map(|&i| y[i]).collect());

                let mut model = LogisticRegression::new()
                    .with_penalty(self.kind.penalty(strength))
                    .with_max_iter(self.max_iter)
                    .with_learning_rate(self.learning_rate);
                model.fit(&x_train, &y_train)?;

                let proba = model.predict_proba(&x_test)?;
                fold_deviances.push(binomial_deviance(&y_test, &proba)?);
            }
            let mean = fold_deviances.iter().sum::<f64>() / fold_deviances.len() as f64;
            grid_deviances.push((strength, mean));
        }

        let (chosen, mean_deviance) = grid_deviances
            .iter()
            .copied()
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .ok_or_else(|| {
                RookiecastError::ComputationError("empty deviance grid".to_string())
            })?;

        debug!(kind = ?self.kind, chosen, mean_deviance, "selected penalty strength");

        let mut model = LogisticRegression::new()
            .with_penalty(self.kind.penalty(chosen))
            .with_max_iter(self.max_iter)
            .with_learning_rate(self.learning_rate);
        model.fit(x, y)?;

        Ok((
            model,
            PenaltySelection {
                chosen,
                mean_deviance,
                grid_deviances,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [-2.0, -1.5],
            [-1.8, -2.1],
            [-1.5, -1.0],
            [-2.2, -1.8],
            [1.5, 2.0],
            [1.8, 1.6],
            [2.1, 2.2],
            [1.6, 1.9],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_plain_fit_separates() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new().with_learning_rate(0.5);
        model.fit(&x, &y).unwrap();

        let predictions = model.predict(&x).unwrap();
        assert_eq!(predictions, y);
    }

    #[test]
    fn test_proba_ordering() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        assert!(proba[0] < 0.5);
        assert!(proba[4] > 0.5);
    }

    #[test]
    fn test_ridge_shrinks_without_zeroing() {
        let (x, y) = separable();

        let mut plain = LogisticRegression::new();
        plain.fit(&x, &y).unwrap();
        let mut ridge = LogisticRegression::new().with_penalty(Penalty::Ridge(1.0));
        ridge.fit(&x, &y).unwrap();

        let plain_norm: f64 = plain.coefficients.as_ref().unwrap().mapv(f64::abs).sum();
        let ridge_norm: f64 = ridge.coefficients.as_ref().unwrap().mapv(f64::abs).sum();
        assert!(ridge_norm < plain_norm);
        assert_eq!(ridge.n_zero_coefficients(), 0);
    }

    #[test]
    fn test_lasso_zeroes_uninformative_coefficient() {
        // Second column is constant: lasso should zero it out
        let x = array![
            [-2.0, 1.0],
            [-1.8, 1.0],
            [-1.5, 1.0],
            [-2.2, 1.0],
            [1.5, 1.0],
            [1.8, 1.0],
            [2.1, 1.0],
            [1.6, 1.0],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];

        let mut model = LogisticRegression::new().with_penalty(Penalty::Lasso(0.1));
        model.fit(&x, &y).unwrap();

        let coefficients = model.coefficients.as_ref().unwrap();
        assert_eq!(coefficients[1], 0.0);
        assert!(coefficients[0].abs() > 0.0);
    }

    #[test]
    fn test_deviance_perfect_and_poor() {
        let y = array![0.0, 1.0];
        let near_perfect = binomial_deviance(&y, &array![0.001, 0.999]).unwrap();
        let poor = binomial_deviance(&y, &array![0.9, 0.1]).unwrap();
        assert!(near_perfect < 0.1);
        assert!(poor > near_perfect);
    }

    #[test]
    fn test_cv_picks_from_grid_and_refits() {
        let x = Array2::from_shape_fn((40, 2), |(r, c)| {
            let base = if r < 20 { -1.0 } else { 1.0 };
            base + 0.05 * ((r * 2 + c) % 7) as f64
        });
        let y = Array1::from_shape_fn(40, |i| if i < 20 { 0.0 } else { 1.0 });

        let grid = vec![0.001, 0.01, 0.1];
        let cv = LogisticRegressionCv::new(PenaltyKind::Ridge, grid.clone(), 4, 5)
            .with_max_iter(300);
        let (model, selection) = cv.fit(&x, &y).unwrap();

        assert!(model.is_fitted);
        assert!(grid.contains(&selection.chosen));
        assert_eq!(selection.grid_deviances.len(), 3);
    }

    #[test]
    fn test_cv_is_deterministic() {
        let x = Array2::from_shape_fn((30, 2), |(r, c)| ((r * 3 + c) % 11) as f64 * 0.2);
        let y = Array1::from_shape_fn(30, |i| if i % 2 == 0 { 0.0 } else { 1.0 });

        let cv = LogisticRegressionCv::new(PenaltyKind::Lasso, vec![0.01, 0.1], 3, 2)
            .with_max_iter(200);
        let (_, a) = cv.fit(&x, &y).unwrap();
        let (_, b) = cv.fit(&x, &y).unwrap();
        assert_eq!(a.chosen, b.chosen);
        assert_eq!(a.grid_deviances, b.grid_deviances);
    }
}
