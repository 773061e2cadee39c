//! Integration test: full pipeline end-to-end

use ndarray::{Array1, Array2};
use polars::prelude::*;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rookiecast::prelude::*;

/// Raw frame mimicking the players file: an identifier column, a few
/// collinear columns to drop, a handful of rows with missing values,
/// and a 323/826 class profile after cleaning.
fn raw_players_df() -> DataFrame {
    let n0 = 323usize;
    let n1 = 826usize;
    let n_clean = n0 + n1;
    let n_missing = 11usize;
    let n = n_clean + n_missing;

    let mut rng = ChaCha8Rng::seed_from_u64(1234);

    let mut names = Vec::with_capacity(n);
    let mut games: Vec<Option<f64>> = Vec::with_capacity(n);
    let mut minutes = Vec::with_capacity(n);
    let mut points = Vec::with_capacity(n);
    let mut fg_made = Vec::with_capacity(n);
    let mut fg_att = Vec::with_capacity(n);
    let mut rebounds = Vec::with_capacity(n);
    let mut assists = Vec::with_capacity(n);
    let mut target = Vec::with_capacity(n);

    for i in 0..n {
        let veteran = i >= n0 && i < n_clean;
        let shift = if veteran { 1.5 } else { 0.0 };

        names.push(format!("Player {}", i));
        // The last n_missing rows get a null and must be dropped
        if i >= n_clean {
            games.push(None);
        } else {
            games.push(Some(40.0 + shift * 10.0 + rng.gen_range(-8.0..8.0)));
        }
        minutes.push(15.0 + shift * 5.0 + rng.gen_range(-4.0..4.0));
        points.push(6.0 + shift * 4.0 + rng.gen_range(-2.0..2.0));
        fg_made.push(2.0 + shift + rng.gen_range(-0.8..0.8));
        fg_att.push(5.0 + shift * 2.0 + rng.gen_range(-1.5..1.5));
        rebounds.push(2.5 + shift + rng.gen_range(-1.0..1.0));
        assists.push(1.5 + shift * 0.8 + rng.gen_range(-0.7..0.7));
        target.push(if veteran { 1.0 } else { 0.0 });
    }

    df!(
        "Name" => names,
        "GamesPlayed" => games,
        "MinutesPlayed" => minutes,
        "Points" => points,
        "FieldGoalsMade" => fg_made,
        "FieldGoalsAttempt" => fg_att,
        "Rebounds" => rebounds,
        "Assists" => assists,
        "Target" => target
    )
    .unwrap()
}

fn test_config() -> PipelineConfig {
    // Smaller forest than the production 405 trees to keep tests quick;
    // the pipeline staging is identical
    PipelineConfig::default()
        .with_forest(ForestParams {
            n_estimators: 10,
            max_features: 2,
            min_samples_leaf: 20,
        })
        .with_penalty_grid(vec![0.01, 0.1])
        .with_cv_folds(3)
}

#[test]
fn test_preparer_cleans_and_drops_columns() {
    let df = raw_players_df();
    let ds = DatasetPreparer::from_config(&test_config())
        .prepare(&df)
        .unwrap();

    // 11 rows had missing values
    assert_eq!(ds.n_rows(), 1149);
    // Name + MinutesPlayed + FieldGoalsMade + FieldGoalsAttempt are gone
    assert_eq!(
        ds.feature_names,
        vec!["GamesPlayed", "Points", "Rebounds", "Assists"]
    );

    let counts = ds.class_counts();
    assert_eq!(counts.get(&0), Some(&323));
    assert_eq!(counts.get(&1), Some(&826));
}

#[test]
fn test_split_follows_the_70_30_rule() {
    let df = raw_players_df();
    let config = test_config();
    let ds = DatasetPreparer::from_config(&config).prepare(&df).unwrap();

    let split = train_test_split(&ds, 0.7, config.seed).unwrap();

    // Per-class rounding: round(0.7*323) + round(0.7*826)
    assert_eq!(split.train.n_rows(), 226 + 578);
    assert_eq!(split.test.n_rows(), 1149 - 804);

    // Disjoint partition covering every row
    let mut all: Vec<usize> = split
        .train_indices
        .iter()
        .chain(split.test_indices.iter())
        .copied()
        .collect();
    all.sort_unstable();
    assert_eq!(all, (0..1149).collect::<Vec<_>>());

    // Stratification within one row of rounding per class
    let train_counts = rookiecast::data::class_counts(&split.train.y);
    assert_eq!(train_counts.get(&0), Some(&226));
    assert_eq!(train_counts.get(&1), Some(&578));
}

#[test]
fn test_split_determinism_across_runs() {
    let df = raw_players_df();
    let config = test_config();
    let ds = DatasetPreparer::from_config(&config).prepare(&df).unwrap();

    let a = train_test_split(&ds, 0.7, 42).unwrap();
    let b = train_test_split(&ds, 0.7, 42).unwrap();
    assert_eq!(a.train_indices, b.train_indices);
    assert_eq!(a.test_indices, b.test_indices);
}

#[test]
fn test_oversampling_reaches_majority_count() {
    let df = raw_players_df();
    let config = test_config();
    let ds = DatasetPreparer::from_config(&config).prepare(&df).unwrap();

    let balanced = RandomOverSampler::new(config.seed).resample(&ds).unwrap();
    assert_eq!(balanced.n_rows(), 1652);

    let counts = balanced.class_counts();
    assert_eq!(counts.get(&0), Some(&826));
    assert_eq!(counts.get(&1), Some(&826));
}

#[test]
fn test_scaler_standardizes_train_only() {
    let df = raw_players_df();
    let config = test_config();
    let ds = DatasetPreparer::from_config(&config).prepare(&df).unwrap();
    let split = train_test_split(&ds, 0.7, config.seed).unwrap();

    let mut scaler = StandardScaler::new();
    let train_scaled = scaler.fit_transform(&split.train.x).unwrap();
    let test_scaled = scaler.transform(&split.test.x).unwrap();

    for j in 0..train_scaled.ncols() {
        let col = train_scaled.column(j);
        let n = col.len() as f64;
        let mean = col.sum() / n;
        let std =
            (col.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
        assert!(mean.abs() < 1e-10, "train column {} mean {}", j, mean);
        assert!((std - 1.0).abs() < 1e-10, "train column {} std {}", j, std);
    }

    // Test partition uses train parameters, so it is close to but not
    // exactly standard
    let col = test_scaled.column(0);
    let test_mean = col.sum() / col.len() as f64;
    assert!(test_mean.abs() > 1e-10);
    assert!(test_mean.abs() < 0.5);
}

#[test]
fn test_end_to_end_comparison_report() {
    let df = raw_players_df();
    let result = rookiecast::pipeline::run(&df, &test_config()).unwrap();

    let reports = result.table.reports();
    assert_eq!(reports.len(), 6);

    let names: Vec<&str> = reports.iter().map(|r| r.model_name.as_str()).collect();
    assert!(names.contains(&"decision_tree"));
    assert!(names.contains(&"random_forest"));
    assert!(names.contains(&"random_forest_balanced"));
    assert!(names.contains(&"logistic"));
    assert!(names.contains(&"logistic_ridge"));
    assert!(names.contains(&"logistic_lasso"));

    for report in reports {
        for metric in [
            report.accuracy,
            report.sensitivity,
            report.specificity,
            report.precision,
            report.f1_score,
            report.auc,
        ] {
            if let Some(v) = metric {
                assert!(
                    (0.0..=1.0).contains(&v),
                    "{}: metric {} out of range",
                    report.model_name,
                    v
                );
            }
        }
        // The classes are well separated, so every model should beat chance
        assert!(
            report.accuracy.unwrap() > 0.6,
            "{} accuracy {:?}",
            report.model_name,
            report.accuracy
        );
        let roc = report.roc.as_ref().unwrap();
        assert_eq!(roc.points.first().map(|p| (p.fpr, p.tpr)), Some((0.0, 0.0)));
        assert_eq!(roc.points.last().map(|p| (p.fpr, p.tpr)), Some((1.0, 1.0)));
    }

    // Importance scores cover every retained predictor
    assert_eq!(result.forest_importance.importances.len(), 4);
    assert!(test_config().penalty_grid.contains(&result.ridge_selection.chosen));
    assert!(test_config().penalty_grid.contains(&result.lasso_selection.chosen));
}

#[test]
fn test_end_to_end_is_reproducible() {
    let df = raw_players_df();
    let config = test_config();

    let a = rookiecast::pipeline::run(&df, &config).unwrap();
    let b = rookiecast::pipeline::run(&df, &config).unwrap();

    for (ra, rb) in a.table.reports().iter().zip(b.table.reports().iter()) {
        assert_eq!(ra.accuracy, rb.accuracy, "model {}", ra.model_name);
        assert_eq!(ra.f1_score, rb.f1_score, "model {}", ra.model_name);
        assert_eq!(ra.auc, rb.auc, "model {}", ra.model_name);
    }
    assert_eq!(
        a.forest_importance.importances,
        b.forest_importance.importances
    );
}

#[test]
fn test_csv_round_trip_through_loader() {
    use std::io::Write;

    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "Name,GamesPlayed,Points,Target").unwrap();
    for i in 0..20 {
        writeln!(
            file,
            "P{},{},{},{}",
            i,
            30 + i,
            5.0 + i as f64 * 0.5,
            if i < 8 { 0 } else { 1 }
        )
        .unwrap();
    }

    let loader = DataLoader::new();
    let df = loader.load_csv(file.path().to_str().unwrap()).unwrap();
    assert_eq!(df.height(), 20);

    let preparer = DatasetPreparer::new("Target", vec!["Name".to_string()]);
    let ds = preparer.prepare(&df).unwrap();
    assert_eq!(ds.n_rows(), 20);
    assert_eq!(ds.feature_names, vec!["GamesPlayed", "Points"]);
}

#[test]
fn test_schema_error_surfaces_from_pipeline() {
    let df = df!(
        "Points" => &[1.0, 2.0, 3.0],
        "Target" => &[0.0, 1.0, 2.0]
    )
    .unwrap();

    let err = rookiecast::pipeline::run(&df, &test_config()).unwrap_err();
    assert!(matches!(err, RookiecastError::SchemaError { .. }));
}

#[test]
fn test_balanced_rerun_sees_balanced_test_set() {
    // With a balanced source, the stratified re-split keeps the test
    // set balanced too; sanity-check through a tiny manual pipeline
    let n = 120;
    let x = Array2::from_shape_fn((n, 3), |(r, c)| {
        let shift = if r % 2 == 0 { 0.0 } else { 2.0 };
        shift + c as f64 * 0.1 + ((r * 7 + c * 3) % 10) as f64 * 0.05
    });
    let y = Array1::from_shape_fn(n, |i| (i % 2) as f64);
    let ds = Dataset::new(x, y, vec!["a".into(), "b".into(), "c".into()]).unwrap();

    let balanced = RandomOverSampler::new(5).resample(&ds).unwrap();
    let split = train_test_split(&balanced, 0.7, 5).unwrap();

    let counts = rookiecast::data::class_counts(&split.test.y);
    assert_eq!(counts.get(&0), counts.get(&1));
}
