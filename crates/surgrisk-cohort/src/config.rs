//! Configuration builder for cohort generation.

use crate::cohort::Cohort;
use crate::error::CohortError;

/// Configuration for synthetic cohort generation.
///
/// Construct via [`CohortConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter | Default |
/// |-----------|---------|
/// | `seed`    | 38      |
#[derive(Debug, Clone)]
pub struct CohortConfig {
    pub(crate) n_cases: usize,
    pub(crate) seed: u64,
}

impl CohortConfig {
    /// Number of cases in the reference analysis cohort.
    pub const DEFAULT_N_CASES: usize = 1000;

    /// Create a new config producing `n_cases` cases.
    ///
    /// # Errors
    ///
    /// Returns [`CohortError::InvalidCaseCount`] if `n_cases` is zero.
    pub fn new(n_cases: usize) -> Result<Self, CohortError> {
        if n_cases == 0 {
            return Err(CohortError::InvalidCaseCount { n_cases });
        }
        Ok(Self { n_cases, seed: 38 })
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the number of cases to generate.
    #[must_use]
    pub fn n_cases(&self) -> usize {
        self.n_cases
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate the cohort.
    ///
    /// The same seed and size always produce an identical cohort.
    ///
    /// # Errors
    ///
    /// Returns [`CohortError::Distribution`] if a sampling distribution
    /// cannot be constructed.
    pub fn generate(&self) -> Result<Cohort, CohortError> {
        crate::generate::generate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_cases_rejected() {
        assert!(matches!(
            CohortConfig::new(0),
            Err(CohortError::InvalidCaseCount { n_cases: 0 })
        ));
    }

    #[test]
    fn builder_sets_fields() {
        let config = CohortConfig::new(250).unwrap().with_seed(7);
        assert_eq!(config.n_cases(), 250);
        assert_eq!(config.seed(), 7);
    }
}
