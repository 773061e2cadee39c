//! Confusion-matrix metrics

use crate::error::{Result, RookiecastError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// 2x2 confusion matrix; positive = veteran (label 1).
///
/// Every derived ratio returns `Option<f64>`: `None` signals an
/// undefined metric (zero denominator) rather than a crash.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    pub fn_: usize,
}

impl ConfusionMatrix {
    /// Build from probability scores thresholded at `threshold`
    pub fn from_scores(
        y_true: &Array1<f64>,
        scores: &Array1<f64>,
        threshold: f64,
    ) -> Result<Self> {
        if y_true.len() != scores.len() {
            return Err(RookiecastError::ShapeError {
                expected: format!("{} scores", y_true.len()),
                actual: format!("{} scores", scores.len()),
            });
        }

        let mut cm = Self {
            tp: 0,
            fp: 0,
            tn: 0,
            fn_: 0,
        };
        for (t, s) in y_true.iter().zip(scores.iter()) {
            let actual = *t > 0.5;
            let predicted = *s >= threshold;
            match (actual, predicted) {
                (true, true) => cm.tp += 1,
                (false, true) => cm.fp += 1,
                (false, false) => cm.tn += 1,
                (true, false) => cm.fn_ += 1,
            }
        }
        Ok(cm)
    }

    /// Build from hard label predictions
    pub fn from_predictions(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        Self::from_scores(y_true, y_pred, 0.5)
    }

    /// Total observations
    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    /// (TP + TN) / total
    pub fn accuracy(&self) -> Option<f64> {
        ratio(self.tp + self.tn, self.total())
    }

    /// TP / (TP + FN), a.k.a. recall
    pub fn sensitivity(&self) -> Option<f64> {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// TN / (TN + FP)
    pub fn specificity(&self) -> Option<f64> {
        ratio(self.tn, self.tn + self.fp)
    }

    /// TP / (TP + FP)
    pub fn precision(&self) -> Option<f64> {
        ratio(self.tp, self.tp + self.fp)
    }

    /// Harmonic mean of precision and sensitivity
    pub fn f1(&self) -> Option<f64> {
        let p = self.precision()?;
        let r = self.sensitivity()?;
        if p + r == 0.0 {
            return None;
        }
        Some(2.0 * p * r / (p + r))
    }
}

fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}
