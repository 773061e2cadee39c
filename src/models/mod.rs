//! Model training module
//!
//! Five classifier kinds behind one capability:
//! - Decision tree (interpretability baseline)
//! - Random forest (fitted on both the raw and the rebalanced split)
//! - Logistic regression: plain, ridge-penalized, lasso-penalized

pub mod decision_tree;
pub mod logistic;
pub mod random_forest;

pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use logistic::{
    binomial_deviance, LogisticRegression, LogisticRegressionCv, Penalty, PenaltyKind,
    PenaltySelection,
};
pub use random_forest::{PermutationImportance, RandomForest};

use crate::error::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Common capability of every trained model: score a feature matrix.
///
/// `predict_proba` returns the veteran-class (label 1) probability per
/// row; `predict` thresholds it at 0.5. The evaluator treats all model
/// kinds uniformly through this trait.
pub trait Classifier: Send + Sync {
    /// Veteran-class probability per row
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Predicted labels at a 0.5 threshold
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }
}

impl Classifier for DecisionTree {
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        DecisionTree::predict_proba(self, x)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        DecisionTree::predict(self, x)
    }
}

impl Classifier for RandomForest {
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        RandomForest::predict_proba(self, x)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        RandomForest::predict(self, x)
    }
}

impl Classifier for LogisticRegression {
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        LogisticRegression::predict_proba(self, x)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        LogisticRegression::predict(self, x)
    }
}

/// Enum holding any fitted model, for collections of heterogeneous runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FittedModel {
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
    Logistic(LogisticRegression),
}

impl Classifier for FittedModel {
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            FittedModel::DecisionTree(m) => m.predict_proba(x),
            FittedModel::RandomForest(m) => m.predict_proba(x),
            FittedModel::Logistic(m) => m.predict_proba(x),
        }
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            FittedModel::DecisionTree(m) => m.predict(x),
            FittedModel::RandomForest(m) => m.predict(x),
            FittedModel::Logistic(m) => m.predict(x),
        }
    }
}
