//! Fitted logistic regression and its coefficient table.

use serde::Serialize;

use crate::error::GlmError;

/// One row of the coefficient table, on both the log-odds and odds scales.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    /// Design column name (`"(Intercept)"` for the intercept).
    pub name: String,
    /// Log-odds estimate.
    pub estimate: f64,
    /// Wald standard error.
    pub std_error: f64,
    /// Wald statistic `estimate / std_error`.
    pub z_value: f64,
    /// Two-sided p-value against the standard normal.
    pub p_value: f64,
    /// `exp(estimate)`.
    pub odds_ratio: f64,
    /// Lower confidence bound on the odds-ratio scale.
    pub ci_lower: f64,
    /// Upper confidence bound on the odds-ratio scale.
    pub ci_upper: f64,
}

/// A fitted binary logistic regression.
#[derive(Debug, Clone, Serialize)]
pub struct LogisticFit {
    pub(crate) intercept: Coefficient,
    pub(crate) coefficients: Vec<Coefficient>,
    pub(crate) confidence_level: f64,
    pub(crate) iterations: usize,
    pub(crate) converged: bool,
    pub(crate) log_likelihood: f64,
    pub(crate) null_deviance: f64,
    pub(crate) deviance: f64,
    pub(crate) n_samples: usize,
}

impl LogisticFit {
    /// Linear predictor (log-odds) for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`GlmError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn linear_predictor(&self, sample: &[f64]) -> Result<f64, GlmError> {
        if sample.len() != self.coefficients.len() {
            return Err(GlmError::PredictionFeatureMismatch {
                expected: self.coefficients.len(),
                got: sample.len(),
            });
        }
        Ok(self.intercept.estimate
            + self
                .coefficients
                .iter()
                .zip(sample)
                .map(|(c, x)| c.estimate * x)
                .sum::<f64>())
    }

    /// Probability of the positive class for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`GlmError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<f64, GlmError> {
        Ok(sigmoid(self.linear_predictor(sample)?))
    }

    /// Positive-class probabilities for a batch of samples.
    ///
    /// # Errors
    ///
    /// Returns [`GlmError::PredictionFeatureMismatch`] if any sample has the wrong feature count.
    pub fn predict_proba_batch(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, GlmError> {
        features.iter().map(|s| self.predict_proba(s)).collect()
    }

    /// The intercept row.
    #[must_use]
    pub fn intercept(&self) -> &Coefficient {
        &self.intercept
    }

    /// Non-intercept rows, one per feature column, in column order.
    #[must_use]
    pub fn coefficients(&self) -> &[Coefficient] {
        &self.coefficients
    }

    /// Look up a non-intercept row by column name.
    #[must_use]
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }

    /// Confidence level used for the intervals.
    #[must_use]
    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Number of IRLS iterations performed.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether the deviance change fell below the tolerance.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Maximized log-likelihood.
    #[must_use]
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Deviance of the intercept-only model.
    #[must_use]
    pub fn null_deviance(&self) -> f64 {
        self.null_deviance
    }

    /// Residual deviance of the fitted model.
    #[must_use]
    pub fn deviance(&self) -> f64 {
        self.deviance
    }

    /// Akaike information criterion, `deviance + 2 * n_parameters`.
    #[must_use]
    pub fn aic(&self) -> f64 {
        self.deviance + 2.0 * (self.coefficients.len() + 1) as f64
    }

    /// Number of training samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Number of non-intercept feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}
