//! Z-score standardization

use crate::error::{Result, RookiecastError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Standard scaler: (x - mean) / std per feature.
///
/// Parameters are computed once from the training partition and reused
/// verbatim for any later partition; the scaler is never refit on test
/// data. A feature with zero training variance is centered but not
/// divided (scale falls back to 1.0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Option<Array1<f64>>,
    scales: Option<Array1<f64>>,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    /// Create an unfitted scaler
    pub fn new() -> Self {
        Self {
            means: None,
            scales: None,
        }
    }

    /// Compute per-feature mean and standard deviation (ddof = 1)
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        let n = x.nrows();
        if n < 2 {
            return Err(RookiecastError::ValidationError(format!(
                "need at least 2 rows to fit a scaler, got {}",
                n
            )));
        }

        let means = x.mean_axis(Axis(0)).ok_or_else(|| {
            RookiecastError::ComputationError("mean over empty axis".to_string())
        })?;

        let mut scales = Array1::zeros(x.ncols());
        for (j, mut_scale) in scales.iter_mut().enumerate() {
            let col = x.column(j);
            let mean = means[j];
            let var = col.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            let std = var.sqrt();
            if std == 0.0 {
                debug!(feature = j, "zero training variance; centering without scaling");
                *mut_scale = 1.0;
            } else {
                *mut_scale = std;
            }
        }

        self.means = Some(means);
        self.scales = Some(scales);
        Ok(self)
    }

    /// Apply the fitted parameters to any partition
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (means, scales) = match (&self.means, &self.scales) {
            (Some(m), Some(s)) => (m, s),
            _ => return Err(RookiecastError::ModelNotFitted),
        };
        if x.ncols() != means.len() {
            return Err(RookiecastError::ShapeError {
                expected: format!("{} columns", means.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let mut out = x.clone();
        for (j, mut col) in out.axis_iter_mut(Axis(1)).enumerate() {
            let mean = means[j];
            let scale = scales[j];
            col.mapv_inplace(|v| (v - mean) / scale);
        }
        Ok(out)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Fitted per-feature means
    pub fn means(&self) -> Option<&Array1<f64>> {
        self.means.as_ref()
    }

    /// Fitted per-feature scales
    pub fn scales(&self) -> Option<&Array1<f64>> {
        self.scales.as_ref()
    }
}
