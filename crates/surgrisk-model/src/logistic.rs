//! Logistic regression behind the [`RiskFitter`] contract.

use surgrisk_cohort::Case;
use surgrisk_glm::{Coefficient, LogisticConfig, LogisticFit};
use tracing::{info, instrument};

use crate::encoding::{CategoryMapping, logistic_columns, logistic_row};
use crate::error::ModelError;
use crate::traits::{RiskFitter, RiskModel, check_training_set};

/// Fitter for the logistic risk model.
///
/// Design columns: age, BMI, ASA code, one treatment dummy per non-reference
/// procedure level, duration, blood loss and the intraoperative-event flag.
#[derive(Debug, Clone, Default)]
pub struct LogisticRiskConfig {
    glm: LogisticConfig,
}

impl LogisticRiskConfig {
    /// Create a config with the default IRLS settings and 95% intervals.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the two-sided confidence level for odds-ratio intervals.
    #[must_use]
    pub fn with_confidence_level(mut self, confidence_level: f64) -> Self {
        self.glm = self.glm.with_confidence_level(confidence_level);
        self
    }

    /// Set the maximum number of IRLS iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.glm = self.glm.with_max_iter(max_iter);
        self
    }

    /// Return the underlying regression settings.
    #[must_use]
    pub fn glm(&self) -> &LogisticConfig {
        &self.glm
    }
}

impl RiskFitter for LogisticRiskConfig {
    type Model = LogisticRiskModel;

    #[instrument(skip_all, fields(n_cases = train.len()))]
    fn fit(&self, train: &[Case]) -> Result<LogisticRiskModel, ModelError> {
        check_training_set(train)?;
        let mapping = CategoryMapping::fit(train);
        let names = logistic_columns(&mapping);
        let design = train
            .iter()
            .map(|c| logistic_row(c, &mapping))
            .collect::<Result<Vec<_>, _>>()?;
        let labels: Vec<bool> = train.iter().map(|c| c.complication_30d).collect();

        let fit = self.glm.fit(&design, &labels, &names)?;
        info!(
            n_columns = names.len(),
            reference = ?mapping.reference(),
            aic = fit.aic(),
            "logistic risk model fitted"
        );
        Ok(LogisticRiskModel { fit, mapping })
    }
}

/// A fitted logistic risk model.
#[derive(Debug, Clone)]
pub struct LogisticRiskModel {
    fit: LogisticFit,
    mapping: CategoryMapping,
}

impl LogisticRiskModel {
    /// Odds ratio, interval and test statistics per non-intercept column.
    #[must_use]
    pub fn odds_ratios(&self) -> &[Coefficient] {
        self.fit.coefficients()
    }

    /// The full regression fit.
    #[must_use]
    pub fn fit(&self) -> &LogisticFit {
        &self.fit
    }

    /// Procedure levels seen in training.
    #[must_use]
    pub fn mapping(&self) -> &CategoryMapping {
        &self.mapping
    }
}

impl RiskModel for LogisticRiskModel {
    fn name(&self) -> &'static str {
        "logistic_regression"
    }

    fn predict_probability(&self, case: &Case) -> Result<f64, ModelError> {
        let row = logistic_row(case, &self.mapping)?;
        Ok(self.fit.predict_proba(&row)?)
    }
}
