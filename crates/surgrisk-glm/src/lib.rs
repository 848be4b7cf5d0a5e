//! Binary logistic regression: fit, infer, predict.
//!
//! Fits a logit-link GLM by iteratively reweighted least squares (Newton's
//! method with step halving), then derives Wald standard errors, p-values,
//! odds ratios and confidence intervals from the inverse Fisher information.

mod config;
mod error;
mod fit;
mod irls;
mod linalg;

pub use config::LogisticConfig;
pub use error::GlmError;
pub use fit::{Coefficient, LogisticFit};
