//! Stratified train/test partitioning.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument, warn};

use crate::case::Case;
use crate::cohort::Cohort;
use crate::error::CohortError;

/// Record of an outcome stratum too small to split at the requested fraction.
///
/// A stratum with at least two cases keeps one case on each side; a stratum
/// with a single case places it in the training subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StratumFallback {
    /// Outcome value of the stratum.
    pub outcome: bool,
    /// Number of cases in the stratum.
    pub n_cases: usize,
    /// Training count implied by the train fraction.
    pub requested_train: usize,
    /// Training count actually used.
    pub applied_train: usize,
}

/// Configuration for a stratified train/test split.
///
/// Construct via [`SplitConfig::new`], then chain `with_seed` if desired.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    train_fraction: f64,
    seed: u64,
}

/// A disjoint train/test partition of a cohort.
///
/// Both subsets keep cohort order; `train_indices()` and `test_indices()`
/// give the cohort positions of their cases.
#[derive(Debug, Clone)]
pub struct Partition {
    train: Vec<Case>,
    test: Vec<Case>,
    train_indices: Vec<usize>,
    test_indices: Vec<usize>,
    fallbacks: Vec<StratumFallback>,
}

impl SplitConfig {
    /// Fraction of the reference analysis assigned to training.
    pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;

    /// Create a new split config.
    ///
    /// # Errors
    ///
    /// Returns [`CohortError::InvalidTrainFraction`] unless
    /// `0.0 < train_fraction < 1.0`.
    pub fn new(train_fraction: f64) -> Result<Self, CohortError> {
        if !(train_fraction > 0.0 && train_fraction < 1.0) {
            return Err(CohortError::InvalidTrainFraction {
                fraction: train_fraction,
            });
        }
        Ok(Self {
            train_fraction,
            seed: 38,
        })
    }

    /// Set the random seed for the within-stratum shuffle.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the train fraction.
    #[must_use]
    pub fn train_fraction(&self) -> f64 {
        self.train_fraction
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Split the cohort, stratified on the 30-day complication outcome.
    ///
    /// Cases are grouped by outcome, shuffled within each group, and the
    /// first `round(n * train_fraction)` of each group go to training.
    ///
    /// # Errors
    ///
    /// Returns [`CohortError::EmptyCohort`] if the cohort has no cases.
    #[instrument(skip_all, fields(n_cases = cohort.len(), train_fraction = self.train_fraction))]
    pub fn split(&self, cohort: &Cohort) -> Result<Partition, CohortError> {
        if cohort.is_empty() {
            return Err(CohortError::EmptyCohort);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut strata: [(bool, Vec<usize>); 2] = [(false, Vec::new()), (true, Vec::new())];
        for (i, case) in cohort.cases().iter().enumerate() {
            strata[usize::from(case.complication_30d)].1.push(i);
        }

        let mut train_indices = Vec::with_capacity(cohort.len());
        let mut test_indices = Vec::with_capacity(cohort.len());
        let mut fallbacks = Vec::new();

        for (outcome, indices) in &mut strata {
            let n = indices.len();
            indices.shuffle(&mut rng);

            let requested = (n as f64 * self.train_fraction).round() as usize;
            let applied = if n >= 2 { requested.clamp(1, n - 1) } else { n };
            if applied != requested || (n > 0 && applied == n) {
                warn!(
                    outcome = *outcome,
                    n_cases = n,
                    requested_train = requested,
                    applied_train = applied,
                    "stratum too small for requested fraction, applying fallback"
                );
                fallbacks.push(StratumFallback {
                    outcome: *outcome,
                    n_cases: n,
                    requested_train: requested,
                    applied_train: applied,
                });
            }

            train_indices.extend_from_slice(&indices[..applied]);
            test_indices.extend_from_slice(&indices[applied..]);
        }

        train_indices.sort_unstable();
        test_indices.sort_unstable();

        let pick = |idx: &[usize]| -> Vec<Case> {
            idx.iter().map(|&i| cohort.cases()[i].clone()).collect()
        };
        let partition = Partition {
            train: pick(&train_indices),
            test: pick(&test_indices),
            train_indices,
            test_indices,
            fallbacks,
        };

        info!(
            n_train = partition.train.len(),
            n_test = partition.test.len(),
            n_fallbacks = partition.fallbacks.len(),
            "cohort partitioned"
        );
        Ok(partition)
    }
}

impl Partition {
    /// Borrow the training cases.
    #[must_use]
    pub fn train(&self) -> &[Case] {
        &self.train
    }

    /// Borrow the holdout cases.
    #[must_use]
    pub fn test(&self) -> &[Case] {
        &self.test
    }

    /// Cohort positions of the training cases, ascending.
    #[must_use]
    pub fn train_indices(&self) -> &[usize] {
        &self.train_indices
    }

    /// Cohort positions of the holdout cases, ascending.
    #[must_use]
    pub fn test_indices(&self) -> &[usize] {
        &self.test_indices
    }

    /// Strata that could not be split at the requested fraction.
    #[must_use]
    pub fn fallbacks(&self) -> &[StratumFallback] {
        &self.fallbacks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{AsaClass, ProcedureType};

    fn cohort_with(n_pos: usize, n_neg: usize) -> Cohort {
        let case = |outcome| Case {
            age: 55,
            bmi: 26.5,
            asa_class: AsaClass::II,
            procedure_type: ProcedureType::Colectomy,
            surgery_duration_minutes: 120,
            estimated_blood_loss_ml: 150.0,
            intraoperative_event: false,
            complication_30d: outcome,
        };
        let mut cases: Vec<Case> = (0..n_neg).map(|_| case(false)).collect();
        cases.extend((0..n_pos).map(|_| case(true)));
        Cohort::new(cases)
    }

    #[test]
    fn invalid_fractions_rejected() {
        for f in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            assert!(SplitConfig::new(f).is_err(), "fraction {f} accepted");
        }
    }

    #[test]
    fn empty_cohort_rejected() {
        let err = SplitConfig::new(0.8).unwrap().split(&Cohort::new(vec![])).unwrap_err();
        assert!(matches!(err, CohortError::EmptyCohort));
    }

    #[test]
    fn exact_stratified_counts() {
        let partition = SplitConfig::new(0.8).unwrap().split(&cohort_with(20, 80)).unwrap();
        assert_eq!(partition.train().len(), 80);
        assert_eq!(partition.test().len(), 20);
        assert_eq!(partition.train().iter().filter(|c| c.complication_30d).count(), 16);
        assert_eq!(partition.test().iter().filter(|c| c.complication_30d).count(), 4);
        assert!(partition.fallbacks().is_empty());
    }

    #[test]
    fn indices_are_disjoint_and_cover_cohort() {
        let partition = SplitConfig::new(0.7).unwrap().split(&cohort_with(13, 41)).unwrap();
        let mut all: Vec<usize> = partition
            .train_indices()
            .iter()
            .chain(partition.test_indices())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..54).collect::<Vec<_>>());
    }

    #[test]
    fn small_minority_keeps_one_case_each_side() {
        // 2 positives at 0.8 would round to 2 in train, leaving none for test.
        let partition = SplitConfig::new(0.8).unwrap().split(&cohort_with(2, 30)).unwrap();
        assert_eq!(partition.train().iter().filter(|c| c.complication_30d).count(), 1);
        assert_eq!(partition.test().iter().filter(|c| c.complication_30d).count(), 1);
        assert_eq!(
            partition.fallbacks(),
            &[StratumFallback {
                outcome: true,
                n_cases: 2,
                requested_train: 2,
                applied_train: 1,
            }]
        );
    }

    #[test]
    fn singleton_minority_goes_to_train() {
        let partition = SplitConfig::new(0.8).unwrap().split(&cohort_with(1, 9)).unwrap();
        assert_eq!(partition.train().iter().filter(|c| c.complication_30d).count(), 1);
        assert_eq!(partition.fallbacks().len(), 1);
        assert!(partition.fallbacks()[0].outcome);
    }

    #[test]
    fn deterministic_with_same_seed() {
        let cohort = cohort_with(10, 40);
        let a = SplitConfig::new(0.8).unwrap().with_seed(5).split(&cohort).unwrap();
        let b = SplitConfig::new(0.8).unwrap().with_seed(5).split(&cohort).unwrap();
        assert_eq!(a.train_indices(), b.train_indices());
        assert_eq!(a.test_indices(), b.test_indices());
    }
}
