use surgrisk_cohort::Case;

use crate::error::ModelError;

/// A fitted model that scores cases.
pub trait RiskModel {
    /// Short stable identifier, used to key artifacts.
    fn name(&self) -> &'static str;

    /// Predicted probability of a 30-day complication, in [0, 1].
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnseenCategory`] when the case's procedure was
    /// not present in the training set.
    fn predict_probability(&self, case: &Case) -> Result<f64, ModelError>;

    /// Score a slice of cases, preserving order.
    ///
    /// # Errors
    ///
    /// Fails on the first case [`RiskModel::predict_probability`] rejects.
    fn predict_probabilities(&self, cases: &[Case]) -> Result<Vec<f64>, ModelError> {
        cases.iter().map(|c| self.predict_probability(c)).collect()
    }
}

/// Fits a [`RiskModel`] from training cases.
pub trait RiskFitter {
    /// The fitted model type.
    type Model: RiskModel;

    /// Fit on `train`; the slice is not modified.
    ///
    /// # Errors
    ///
    /// | Variant                            | When                                 |
    /// |------------------------------------|--------------------------------------|
    /// | [`ModelError::EmptyTrainingSet`]   | `train` is empty                     |
    /// | [`ModelError::DegenerateOutcome`]  | every case has the same outcome      |
    /// | [`ModelError::Glm`] / [`ModelError::Rf`] | the numeric fit fails          |
    fn fit(&self, train: &[Case]) -> Result<Self::Model, ModelError>;
}

/// Reject empty and single-outcome training sets; returns the positive count.
pub(crate) fn check_training_set(train: &[Case]) -> Result<usize, ModelError> {
    if train.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }
    let n_positive = train.iter().filter(|c| c.complication_30d).count();
    if n_positive == 0 || n_positive == train.len() {
        return Err(ModelError::DegenerateOutcome {
            outcome: n_positive > 0,
            n_cases: train.len(),
        });
    }
    Ok(n_positive)
}
