//! End-to-end training-and-comparison pipeline
//!
//! Single-threaded staging: prepare → split → {scale → logistic family;
//! raw → tree family} → rebalance → re-split → second forest →
//! comparison table. Each stage consumes immutable artifacts and
//! returns new ones; only the explicit artifacts flow forward.

use crate::config::PipelineConfig;
use crate::data::{
    train_test_split, Dataset, DatasetPreparer, RandomOverSampler, StandardScaler,
};
use crate::error::Result;
use crate::eval::{score_report, ComparisonTable};
use crate::models::{
    DecisionTree, FittedModel, LogisticRegression, LogisticRegressionCv, PenaltyKind,
    PenaltySelection, PermutationImportance, RandomForest,
};
use polars::prelude::DataFrame;
use std::time::Instant;
use tracing::info;

/// Permutation repeats for the forest importance pass
const MDA_REPEATS: usize = 5;

/// Everything the pipeline produces for the reporting layer
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// One evaluation row per model run
    pub table: ComparisonTable,
    /// The fitted models, named as in the table, so callers can score
    /// further rows themselves
    pub models: Vec<(String, FittedModel)>,
    /// Predictor names, in matrix column order
    pub feature_names: Vec<String>,
    /// Mean-decrease-in-accuracy importances of the first forest run
    pub forest_importance: PermutationImportance,
    /// Penalty chosen by the ridge cross-validation
    pub ridge_selection: PenaltySelection,
    /// Penalty chosen by the lasso cross-validation
    pub lasso_selection: PenaltySelection,
}

/// Run the full pipeline on a raw DataFrame
pub fn run(df: &DataFrame, config: &PipelineConfig) -> Result<PipelineResult> {
    let dataset = DatasetPreparer::from_config(config).prepare(df)?;
    info!(
        rows = dataset.n_rows(),
        features = dataset.n_features(),
        "dataset prepared"
    );
    run_prepared(&dataset, config)
}

/// Run the pipeline on an already-prepared dataset
pub fn run_prepared(dataset: &Dataset, config: &PipelineConfig) -> Result<PipelineResult> {
    let start = Instant::now();

    let split = train_test_split(dataset, config.train_fraction, config.seed)?;
    info!(
        train_rows = split.train.n_rows(),
        test_rows = split.test.n_rows(),
        "stratified split"
    );

    // Scaled copies for the logistic family; tree family sees raw values
    let mut scaler = StandardScaler::new();
    let x_train_scaled = scaler.fit_transform(&split.train.x)?;
    let x_test_scaled = scaler.transform(&split.test.x)?;

    let mut table = ComparisonTable::new();

    // Decision tree: interpretability baseline, default complexity
    let fit_start = Instant::now();
    let mut tree = DecisionTree::new().with_seed(config.seed);
    tree.fit(&split.train.x, &split.train.y)?;
    info!(secs = fit_start.elapsed().as_secs_f64(), "decision tree fitted");
    table.push(score_report(
        "decision_tree",
        &tree,
        &split.test.x,
        &split.test.y,
        config.threshold,
    )?);

    // Random forest on the original (imbalanced) split
    let fit_start = Instant::now();
    let mut forest = forest_from(config);
    forest.fit(&split.train.x, &split.train.y)?;
    info!(
        secs = fit_start.elapsed().as_secs_f64(),
        trees = forest.n_trees(),
        "random forest fitted"
    );
    let forest_importance =
        forest.permutation_importance(&split.test.x, &split.test.y, MDA_REPEATS, config.seed)?;
    table.push(score_report(
        "random_forest",
        &forest,
        &split.test.x,
        &split.test.y,
        config.threshold,
    )?);

    // Logistic family on scaled features
    let mut logistic = LogisticRegression::new();
    logistic.fit(&x_train_scaled, &split.train.y)?;
    table.push(score_report(
        "logistic",
        &logistic,
        &x_test_scaled,
        &split.test.y,
        config.threshold,
    )?);

    let ridge_cv = LogisticRegressionCv::new(
        PenaltyKind::Ridge,
        config.penalty_grid.clone(),
        config.cv_folds,
        config.seed,
    );
    let (ridge, ridge_selection) = ridge_cv.fit(&x_train_scaled, &split.train.y)?;
    info!(penalty = ridge_selection.chosen, "ridge penalty selected");
    table.push(score_report(
        "logistic_ridge",
        &ridge,
        &x_test_scaled,
        &split.test.y,
        config.threshold,
    )?);

    let lasso_cv = LogisticRegressionCv::new(
        PenaltyKind::Lasso,
        config.penalty_grid.clone(),
        config.cv_folds,
        config.seed,
    );
    let (lasso, lasso_selection) = lasso_cv.fit(&x_train_scaled, &split.train.y)?;
    info!(
        penalty = lasso_selection.chosen,
        zeroed = lasso.n_zero_coefficients(),
        "lasso penalty selected"
    );
    table.push(score_report(
        "logistic_lasso",
        &lasso,
        &x_test_scaled,
        &split.test.y,
        config.threshold,
    )?);

    // Rebalance the full cleaned dataset, re-split it independently,
    // and rerun the forest with identical hyperparameters
    let balanced = RandomOverSampler::new(config.seed).resample(dataset)?;
    let balanced_split = train_test_split(&balanced, config.train_fraction, config.seed)?;
    info!(
        train_rows = balanced_split.train.n_rows(),
        test_rows = balanced_split.test.n_rows(),
        "balanced split"
    );

    let fit_start = Instant::now();
    let mut balanced_forest = forest_from(config);
    balanced_forest.fit(&balanced_split.train.x, &balanced_split.train.y)?;
    info!(
        secs = fit_start.elapsed().as_secs_f64(),
        "balanced random forest fitted"
    );
    table.push(score_report(
        "random_forest_balanced",
        &balanced_forest,
        &balanced_split.test.x,
        &balanced_split.test.y,
        config.threshold,
    )?);

    info!(
        secs = start.elapsed().as_secs_f64(),
        models = table.reports().len(),
        "pipeline complete"
    );

    let models = vec![
        ("decision_tree".to_string(), FittedModel::DecisionTree(tree)),
        ("random_forest".to_string(), FittedModel::RandomForest(forest)),
        ("logistic".to_string(), FittedModel::Logistic(logistic)),
        ("logistic_ridge".to_string(), FittedModel::Logistic(ridge)),
        ("logistic_lasso".to_string(), FittedModel::Logistic(lasso)),
        (
            "random_forest_balanced".to_string(),
            FittedModel::RandomForest(balanced_forest),
        ),
    ];

    Ok(PipelineResult {
        table,
        models,
        feature_names: dataset.feature_names.clone(),
        forest_importance,
        ridge_selection,
        lasso_selection,
    })
}

fn forest_from(config: &PipelineConfig) -> RandomForest {
    RandomForest::new(config.forest.n_estimators)
        .with_max_features(config.forest.max_features)
        .with_min_samples_leaf(config.forest.min_samples_leaf)
        .with_seed(config.seed)
}
