//! ROC curve and AUC

use crate::error::{Result, RookiecastError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// One point of the ROC curve
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RocPoint {
    pub fpr: f64,
    pub tpr: f64,
}

/// ROC curve: the threshold sweep over all produced scores, plus its
/// trapezoidal area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RocCurve {
    /// (FPR, TPR) points from (0,0) to (1,1), one per distinct score
    pub points: Vec<RocPoint>,
    /// Area under the curve
    pub auc: f64,
}

/// Sweep the decision threshold over the full score range.
///
/// Requires both classes in `y_true`; with one class absent the curve
/// (and AUC) is undefined and a `DataQualityError` is returned so the
/// caller can report the metric as missing.
pub fn roc_curve(y_true: &Array1<f64>, scores: &Array1<f64>) -> Result<RocCurve> {
    if y_true.len() != scores.len() {
        return Err(RookiecastError::ShapeError {
            expected: format!("{} scores", y_true.len()),
            actual: format!("{} scores", scores.len()),
        });
    }

    let n = y_true.len();
    let n_pos = y_true.iter().filter(|&&v| v > 0.5).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(RookiecastError::DataQualityError(
            "ROC curve undefined: a class has zero members in the evaluation set".to_string(),
        ));
    }

    // Descending score order; ties advance the curve as one group
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut points = vec![RocPoint { fpr: 0.0, tpr: 0.0 }];
    let mut tp = 0usize;
    let mut fp = 0usize;

    let mut i = 0;
    while i < n {
        let score = scores[order[i]];
        while i < n && scores[order[i]] == score {
            if y_true[order[i]] > 0.5 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        points.push(RocPoint {
            fpr: fp as f64 / n_neg as f64,
            tpr: tp as f64 / n_pos as f64,
        });
    }

    let auc = points
        .windows(2)
        .map(|w| (w[1].fpr - w[0].fpr) * (w[0].tpr + w[1].tpr) / 2.0)
        .sum();

    Ok(RocCurve { points, auc })
}
