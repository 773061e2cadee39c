//! Pipeline configuration

use serde::{Deserialize, Serialize};

/// Forest hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees in the ensemble
    pub n_estimators: usize,
    /// Features considered at each split
    pub max_features: usize,
    /// Minimum samples in a leaf
    pub min_samples_leaf: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 405,
            max_features: 4,
            min_samples_leaf: 5,
        }
    }
}

/// Configuration for the full training-and-comparison pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Binary label column
    pub target_column: String,
    /// Columns removed before modeling (identifier + collinear predictors)
    pub drop_columns: Vec<String>,
    /// Fraction of rows assigned to the training partition
    pub train_fraction: f64,
    /// Seed propagated to every stochastic stage
    pub seed: u64,
    /// Decision threshold for probability-producing models
    pub threshold: f64,
    /// Random forest hyperparameters (shared by both forest runs)
    pub forest: ForestParams,
    /// Penalty strengths tried by the ridge/lasso cross-validation
    pub penalty_grid: Vec<f64>,
    /// Folds used by that cross-validation
    pub cv_folds: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_column: "Target".to_string(),
            drop_columns: vec![
                "Name".to_string(),
                "MinutesPlayed".to_string(),
                "FieldGoalsMade".to_string(),
                "FieldGoalsAttempt".to_string(),
            ],
            train_fraction: 0.7,
            seed: 42,
            threshold: 0.5,
            forest: ForestParams::default(),
            penalty_grid: vec![0.0001, 0.001, 0.01, 0.1, 1.0],
            cv_folds: 5,
        }
    }
}

impl PipelineConfig {
    /// Create a config for the given label column
    pub fn new(target_column: impl Into<String>) -> Self {
        Self {
            target_column: target_column.into(),
            ..Default::default()
        }
    }

    /// Set the columns removed before modeling
    pub fn with_drop_columns(mut self, columns: Vec<String>) -> Self {
        self.drop_columns = columns;
        self
    }

    /// Set the training fraction
    pub fn with_train_fraction(mut self, fraction: f64) -> Self {
        self.train_fraction = fraction;
        self
    }

    /// Set the seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the decision threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set forest hyperparameters
    pub fn with_forest(mut self, forest: ForestParams) -> Self {
        self.forest = forest;
        self
    }

    /// Set the penalty grid for the cross-validated regressions
    pub fn with_penalty_grid(mut self, grid: Vec<f64>) -> Self {
        self.penalty_grid = grid;
        self
    }

    /// Set the number of cross-validation folds
    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }
}
