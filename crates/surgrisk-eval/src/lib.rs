//! Holdout evaluation for any [`RiskModel`](surgrisk_model::RiskModel).
//!
//! Scores every test case, thresholds the probabilities into classes, and
//! derives the ROC curve, its trapezoidal AUC, the binary confusion matrix
//! and the usual rates computed from it. Rates whose denominator is zero are
//! reported as [`Ratio::Undefined`] rather than as NaN or zero.

mod confusion;
mod error;
mod evaluate;
mod ratio;
mod roc;

pub use confusion::{BinaryConfusion, ClassificationMetrics};
pub use error::EvalError;
pub use evaluate::{DEFAULT_THRESHOLD, EvaluationResult, Evaluator, Prediction, evaluate};
pub use ratio::Ratio;
pub use roc::{RocCurve, RocPoint};
