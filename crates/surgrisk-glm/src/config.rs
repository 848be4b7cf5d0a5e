//! Configuration builder for logistic regression fitting.

use crate::error::GlmError;
use crate::fit::LogisticFit;

/// Configuration for a logistic regression fit.
///
/// Construct via [`LogisticConfig::new`], then chain `with_*` methods.
/// An intercept is always included.
///
/// # Defaults
///
/// | Parameter          | Default |
/// |--------------------|---------|
/// | `max_iter`         | 25      |
/// | `tol`              | 1e-8    |
/// | `confidence_level` | 0.95    |
#[derive(Debug, Clone)]
pub struct LogisticConfig {
    pub(crate) max_iter: usize,
    pub(crate) tol: f64,
    pub(crate) confidence_level: f64,
}

impl LogisticConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_iter: 25,
            tol: 1e-8,
            confidence_level: 0.95,
        }
    }

    /// Set the maximum number of IRLS iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the relative deviance change below which IRLS stops.
    #[must_use]
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the two-sided confidence level for coefficient intervals.
    #[must_use]
    pub fn with_confidence_level(mut self, confidence_level: f64) -> Self {
        self.confidence_level = confidence_level;
        self
    }

    // --- Getters ---

    /// Return the maximum number of IRLS iterations.
    #[must_use]
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Return the convergence tolerance.
    #[must_use]
    pub fn tol(&self) -> f64 {
        self.tol
    }

    /// Return the confidence level.
    #[must_use]
    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Fit a logistic regression on the provided dataset.
    ///
    /// Rows are `features[sample_idx][feature_idx]` without an intercept
    /// column; `labels[sample_idx]` is the binary outcome.
    ///
    /// # Errors
    ///
    /// | Variant                                 | When                                        |
    /// |-----------------------------------------|---------------------------------------------|
    /// | [`GlmError::InvalidMaxIter`]            | `max_iter` is zero                          |
    /// | [`GlmError::InvalidTolerance`]          | `tol` is not positive and finite            |
    /// | [`GlmError::InvalidConfidenceLevel`]    | `confidence_level` is not in (0.0, 1.0)     |
    /// | [`GlmError::EmptyDataset`]              | `features` is empty                         |
    /// | [`GlmError::ZeroFeatures`]              | rows have zero feature columns              |
    /// | [`GlmError::LabelCountMismatch`]        | `labels.len() != features.len()`            |
    /// | [`GlmError::FeatureNameMismatch`]       | `feature_names.len()` differs from columns  |
    /// | [`GlmError::FeatureCountMismatch`]      | rows have inconsistent lengths              |
    /// | [`GlmError::NonFiniteValue`]            | any value is NaN or infinite                |
    /// | [`GlmError::SingleClass`]               | every label is identical                    |
    /// | [`GlmError::SingularInformation`]       | collinear columns or complete separation    |
    pub fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[bool],
        feature_names: &[String],
    ) -> Result<LogisticFit, GlmError> {
        crate::irls::fit(self, features, labels, feature_names)
    }
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self::new()
    }
}
