//! Model evaluation module
//!
//! Confusion-matrix metrics, ROC/AUC, and the cross-model comparison
//! table. All model kinds are scored uniformly through the
//! [`Classifier`](crate::models::Classifier) capability.

mod metrics;
mod report;
mod roc;

pub use metrics::ConfusionMatrix;
pub use report::{score_report, ComparisonTable, EvaluationReport};
pub use roc::{roc_curve, RocCurve, RocPoint};
