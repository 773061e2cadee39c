//! Cleaning and extraction of the raw player records

use crate::config::PipelineConfig;
use crate::data::{class_counts, Dataset};
use crate::error::{Result, RookiecastError};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use tracing::{debug, info};

/// Turns the raw DataFrame into a modeling-ready [`Dataset`].
///
/// Rows with any missing value are dropped (no imputation), the label is
/// validated as strictly binary, and the configured non-predictive /
/// collinear columns are removed.
pub struct DatasetPreparer {
    target_column: String,
    drop_columns: Vec<String>,
}

impl DatasetPreparer {
    /// Create a preparer for the given label column and column drops
    pub fn new(target_column: impl Into<String>, drop_columns: Vec<String>) -> Self {
        Self {
            target_column: target_column.into(),
            drop_columns,
        }
    }

    /// Create a preparer from a pipeline config
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.target_column.clone(), config.drop_columns.clone())
    }

    /// Clean and extract. The input frame is never modified.
    pub fn prepare(&self, df: &DataFrame) -> Result<Dataset> {
        if df.column(&self.target_column).is_err() {
            return Err(RookiecastError::SchemaError {
                column: self.target_column.clone(),
                detail: "label column not found".to_string(),
            });
        }

        let n_raw = df.height();
        let cleaned = df.drop_nulls::<String>(None)?;
        let n_removed = n_raw - cleaned.height();
        if n_removed > 0 {
            info!(rows_removed = n_removed, "dropped rows with missing values");
        }
        if cleaned.height() == 0 {
            return Err(RookiecastError::DataQualityError(
                "no rows remain after removing missing values".to_string(),
            ));
        }

        let y = self.extract_labels(&cleaned)?;

        let feature_names: Vec<String> = cleaned
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .filter(|name| *name != self.target_column && !self.drop_columns.contains(name))
            .collect();
        for dropped in &self.drop_columns {
            debug!(column = %dropped, "removed from predictor set");
        }
        if feature_names.is_empty() {
            return Err(RookiecastError::SchemaError {
                column: self.target_column.clone(),
                detail: "no predictor columns remain after drops".to_string(),
            });
        }

        let x = columns_to_array2(&cleaned, &feature_names)?;
        let dataset = Dataset::new(x, y, feature_names)?;

        let counts = class_counts(&dataset.y);
        for (class, count) in &counts {
            info!(class, count, "class distribution after cleaning");
        }
        if counts.len() < 2 {
            return Err(RookiecastError::DataQualityError(format!(
                "label '{}' has a single class after cleaning; both classes are required",
                self.target_column
            )));
        }

        Ok(dataset)
    }

    fn extract_labels(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let series = df
            .column(&self.target_column)
            .map_err(|_| RookiecastError::SchemaError {
                column: self.target_column.clone(),
                detail: "label column not found".to_string(),
            })?;

        let as_f64 = series
            .cast(&DataType::Float64)
            .map_err(|_| RookiecastError::SchemaError {
                column: self.target_column.clone(),
                detail: "label column is not numeric".to_string(),
            })?;

        let values: Vec<f64> = as_f64
            .f64()
            .map_err(|e| RookiecastError::DataError(e.to_string()))?
            .into_iter()
            .map(|opt| {
                opt.ok_or_else(|| RookiecastError::SchemaError {
                    column: self.target_column.clone(),
                    detail: "label contains a missing value after cleaning".to_string(),
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        if let Some(bad) = values.iter().find(|&&v| v != 0.0 && v != 1.0) {
            return Err(RookiecastError::SchemaError {
                column: self.target_column.clone(),
                detail: format!("label value {} outside {{0, 1}}", bad),
            });
        }

        Ok(Array1::from_vec(values))
    }
}

/// Extract named columns into a row-major `Array2<f64>`.
/// Columns are pulled as contiguous f64 vectors first, then assembled
/// via `from_shape_fn` (cache-friendly for column-major frame data).
pub fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let series = df
                .column(col_name)
                .map_err(|_| RookiecastError::SchemaError {
                    column: col_name.clone(),
                    detail: "predictor column not found".to_string(),
                })?;
            let series_f64 =
                series
                    .cast(&DataType::Float64)
                    .map_err(|_| RookiecastError::SchemaError {
                        column: col_name.clone(),
                        detail: "predictor column is not numeric".to_string(),
                    })?;
            let values: Vec<f64> = series_f64
                .f64()
                .map_err(|e| RookiecastError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_df() -> DataFrame {
        df!(
            "Name" => &["A. Guard", "B. Forward", "C. Center", "D. Wing"],
            "GamesPlayed" => &[Some(36.0), Some(80.0), None, Some(62.0)],
            "Points" => &[7.4, 21.5, 9.9, 14.2],
            "MinutesPlayed" => &[17.8, 36.1, 22.0, 30.4],
            "Target" => &[0.0, 1.0, 1.0, 1.0]
        )
        .unwrap()
    }

    #[test]
    fn test_prepare_drops_missing_rows_and_columns() {
        let preparer = DatasetPreparer::new(
            "Target",
            vec!["Name".to_string(), "MinutesPlayed".to_string()],
        );
        let ds = preparer.prepare(&raw_df()).unwrap();

        // One row had a null GamesPlayed
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.feature_names, vec!["GamesPlayed", "Points"]);
        assert_eq!(ds.y.len(), 3);
    }

    #[test]
    fn test_missing_label_column() {
        let preparer = DatasetPreparer::new("CareerLength", vec![]);
        let err = preparer.prepare(&raw_df()).unwrap_err();
        assert!(matches!(err, RookiecastError::SchemaError { .. }));
    }

    #[test]
    fn test_nonbinary_label_rejected() {
        let df = df!(
            "Points" => &[7.4, 21.5],
            "Target" => &[0.0, 3.0]
        )
        .unwrap();
        let preparer = DatasetPreparer::new("Target", vec![]);
        let err = preparer.prepare(&df).unwrap_err();
        assert!(matches!(err, RookiecastError::SchemaError { .. }));
    }

    #[test]
    fn test_single_class_rejected() {
        let df = df!(
            "Points" => &[7.4, 21.5],
            "Target" => &[1.0, 1.0]
        )
        .unwrap();
        let preparer = DatasetPreparer::new("Target", vec![]);
        let err = preparer.prepare(&df).unwrap_err();
        assert!(matches!(err, RookiecastError::DataQualityError(_)));
    }
}
