//! rookiecast - Career-longevity classification pipeline
//!
//! Predicts whether a basketball player's career will last at least five
//! years from career-aggregate statistics, by training and comparing:
//! - a decision tree
//! - a random forest, before and after class rebalancing
//! - plain, ridge-penalized, and lasso-penalized logistic regression
//!
//! # Modules
//!
//! - [`data`] - Loading, cleaning, splitting, scaling, rebalancing
//! - [`models`] - The five classifier kinds behind one capability
//! - [`eval`] - Confusion-matrix metrics, ROC/AUC, comparison table
//! - [`pipeline`] - End-to-end orchestration of the six model runs
//! - [`config`] - Pipeline configuration
//! - [`cli`] - Command-line interface

pub mod error;

pub mod config;
pub mod data;
pub mod eval;
pub mod models;
pub mod pipeline;

pub mod cli;

pub use error::{Result, RookiecastError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ForestParams, PipelineConfig};
    pub use crate::data::{
        train_test_split, DataLoader, Dataset, DatasetPreparer, RandomOverSampler,
        StandardScaler, StratifiedKFold, TrainTestSplit,
    };
    pub use crate::error::{Result, RookiecastError};
    pub use crate::eval::{
        score_report, ComparisonTable, ConfusionMatrix, EvaluationReport, RocCurve,
    };
    pub use crate::models::{
        Classifier, DecisionTree, FittedModel, LogisticRegression, LogisticRegressionCv,
        Penalty, PenaltyKind, RandomForest,
    };
    pub use crate::pipeline::{run, run_prepared, PipelineResult};
}
