//! Case-level 30-day complication risk models.
//!
//! [`RiskFitter`] turns a training slice of [`Case`](surgrisk_cohort::Case)s
//! into a [`RiskModel`], which scores individual cases. Two implementations
//! share that contract: [`LogisticRiskConfig`] and [`ForestRiskConfig`].
//! Both encode procedure type through a [`CategoryMapping`] fitted on the
//! training cases, so a procedure never seen in training is rejected at
//! scoring time instead of being silently mis-encoded.

mod encoding;
mod error;
mod forest;
mod logistic;
mod traits;

pub use encoding::CategoryMapping;
pub use error::ModelError;
pub use forest::{ForestRiskConfig, ForestRiskModel};
pub use logistic::{LogisticRiskConfig, LogisticRiskModel};
pub use traits::{RiskFitter, RiskModel};
