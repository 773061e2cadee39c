//! Per-model evaluation reports and the cross-model comparison table

use super::metrics::ConfusionMatrix;
use super::roc::{roc_curve, RocCurve};
use crate::error::Result;
use crate::models::Classifier;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Evaluation of one trained model against a held-out set.
/// Immutable once computed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub model_name: String,
    pub confusion: ConfusionMatrix,
    pub accuracy: Option<f64>,
    pub sensitivity: Option<f64>,
    pub specificity: Option<f64>,
    pub precision: Option<f64>,
    pub f1_score: Option<f64>,
    pub auc: Option<f64>,
    /// Full threshold sweep, for an external plotting layer
    pub roc: Option<RocCurve>,
}

/// Score a model on a held-out set: confusion-matrix metrics at the
/// given threshold plus the full ROC sweep.
///
/// The AUC slot stays `None` when the evaluation set contains a single
/// class (the curve is undefined there); nothing panics.
pub fn score_report<C: Classifier + ?Sized>(
    model_name: &str,
    model: &C,
    x_test: &Array2<f64>,
    y_test: &Array1<f64>,
    threshold: f64,
) -> Result<EvaluationReport> {
    let scores = model.predict_proba(x_test)?;
    let confusion = ConfusionMatrix::from_scores(y_test, &scores, threshold)?;

    let both_classes_present =
        confusion.tp + confusion.fn_ > 0 && confusion.tn + confusion.fp > 0;
    let roc = if both_classes_present {
        Some(roc_curve(y_test, &scores)?)
    } else {
        None
    };

    Ok(EvaluationReport {
        model_name: model_name.to_string(),
        confusion,
        accuracy: confusion.accuracy(),
        sensitivity: confusion.sensitivity(),
        specificity: confusion.specificity(),
        precision: confusion.precision(),
        f1_score: confusion.f1(),
        auc: roc.as_ref().map(|r| r.auc),
        roc,
    })
}

/// Comparison table across model runs, keyed by model name.
/// Rows keep their insertion order; no ranking criterion is imposed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonTable {
    reports: Vec<EvaluationReport>,
}

impl ComparisonTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a model's report
    pub fn push(&mut self, report: EvaluationReport) {
        self.reports.push(report);
    }

    /// All reports, in insertion order
    pub fn reports(&self) -> &[EvaluationReport] {
        &self.reports
    }

    /// Look up a report by model name
    pub fn get(&self, model_name: &str) -> Option<&EvaluationReport> {
        self.reports.iter().find(|r| r.model_name == model_name)
    }

    /// Plain-text table with one row per model
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:<26} {:>9} {:>12} {:>12} {:>10} {:>9} {:>7}\n",
            "Model", "Accuracy", "Sensitivity", "Specificity", "Precision", "F1_Score", "AUC"
        ));
        for report in &self.reports {
            out.push_str(&format!(
                "{:<26} {:>9} {:>12} {:>12} {:>10} {:>9} {:>7}\n",
                report.model_name,
                fmt_metric(report.accuracy),
                fmt_metric(report.sensitivity),
                fmt_metric(report.specificity),
                fmt_metric(report.precision),
                fmt_metric(report.f1_score),
                fmt_metric(report.auc),
            ));
        }
        out
    }

    /// JSON rendering of the full table (ROC sweeps included)
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.reports)?)
    }
}

fn fmt_metric(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => "n/a".to_string(),
    }
}
