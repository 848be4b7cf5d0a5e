//! Prediction methods for the forest.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::RfError;
use crate::forest::RandomForest;

impl RandomForest {
    /// Probability of the positive class: the mean leaf positive fraction
    /// across all trees.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<f64, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let total: f64 = self.trees.iter().map(|t| t.leaf_fraction(sample)).sum();
        Ok(total / self.trees.len() as f64)
    }

    /// Hard classification at the 0.5 cut: positive when the probability
    /// strictly exceeds one half.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<bool, RfError> {
        Ok(self.predict_proba(sample)? > 0.5)
    }

    /// Positive-class probabilities for a batch of samples, in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any sample has the wrong feature count.
    pub fn predict_proba_batch(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, RfError> {
        features
            .into_par_iter()
            .map(|sample| self.predict_proba(sample))
            .collect()
    }

    /// Return the number of features this forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the individual trees.
    #[must_use]
    pub fn trees(&self) -> &[crate::tree::DecisionTree] {
        &self.trees
    }

    /// Return the feature names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}
