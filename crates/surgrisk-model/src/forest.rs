//! Random forest behind the [`RiskFitter`] contract.

use surgrisk_cohort::Case;
use surgrisk_rf::{
    MaxFeatures, OobMode, OobScore, RandomForest, RandomForestConfig, RankedFeature,
    SplitCriterion, TrainingMetadata,
};
use tracing::{info, instrument};

use crate::encoding::{CategoryMapping, FOREST_COLUMNS, forest_row};
use crate::error::ModelError;
use crate::traits::{RiskFitter, RiskModel, check_training_set};

/// Fitter for the random forest risk model.
///
/// # Defaults
///
/// | Parameter            | Default    |
/// |----------------------|------------|
/// | `max_depth`          | `None`     |
/// | `max_features`       | `Sqrt`     |
/// | `criterion`          | `Gini`     |
/// | `bootstrap_fraction` | 1.0        |
/// | `seed`               | 38         |
/// | `oob_mode`           | `Disabled` |
#[derive(Debug, Clone)]
pub struct ForestRiskConfig {
    rf: RandomForestConfig,
}

impl ForestRiskConfig {
    /// Create a config with `n_trees` trees
    /// ([`surgrisk_rf::DEFAULT_N_TREES`] is the usual choice).
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Rf`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, ModelError> {
        Ok(Self {
            rf: RandomForestConfig::new(n_trees)?,
        })
    }

    /// Set the master seed for bootstrap and feature sampling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rf = self.rf.with_seed(seed);
        self
    }

    /// Set the maximum tree depth. `None` means unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.rf = self.rf.with_max_depth(max_depth);
        self
    }

    /// Set how many features are drawn as split candidates at each node.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.rf = self.rf.with_max_features(max_features);
        self
    }

    /// Set the node impurity measure.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.rf = self.rf.with_criterion(criterion);
        self
    }

    /// Set bootstrap draws per tree as a share of the training size.
    /// Checked at fit time; must lie in (0.0, 1.0].
    #[must_use]
    pub fn with_bootstrap_fraction(mut self, bootstrap_fraction: f64) -> Self {
        self.rf = self.rf.with_bootstrap_fraction(bootstrap_fraction);
        self
    }

    /// Set whether out-of-bag accuracy is computed.
    #[must_use]
    pub fn with_oob_mode(mut self, oob_mode: OobMode) -> Self {
        self.rf = self.rf.with_oob_mode(oob_mode);
        self
    }

    /// Return the underlying forest settings.
    #[must_use]
    pub fn rf(&self) -> &RandomForestConfig {
        &self.rf
    }
}

impl RiskFitter for ForestRiskConfig {
    type Model = ForestRiskModel;

    #[instrument(skip_all, fields(n_cases = train.len(), n_trees = self.rf.n_trees()))]
    fn fit(&self, train: &[Case]) -> Result<ForestRiskModel, ModelError> {
        check_training_set(train)?;
        let mapping = CategoryMapping::fit(train);
        let features = train
            .iter()
            .map(|c| forest_row(c, &mapping))
            .collect::<Result<Vec<_>, _>>()?;
        let labels: Vec<bool> = train.iter().map(|c| c.complication_30d).collect();
        let names: Vec<String> = FOREST_COLUMNS.map(String::from).to_vec();

        let (forest, importances, oob_score, metadata) =
            self.rf.fit(&features, &labels, &names)?.into_parts();

        info!(
            top_feature = importances.first().map(|f| f.name.as_str()),
            oob_accuracy = oob_score.as_ref().map(|s| s.accuracy),
            "forest risk model fitted"
        );
        Ok(ForestRiskModel {
            forest,
            mapping,
            importances,
            oob_score,
            metadata,
        })
    }
}

/// A fitted random forest risk model.
#[derive(Debug, Clone)]
pub struct ForestRiskModel {
    forest: RandomForest,
    mapping: CategoryMapping,
    importances: Vec<RankedFeature>,
    oob_score: Option<OobScore>,
    metadata: TrainingMetadata,
}

impl ForestRiskModel {
    /// Mean-decrease-in-impurity importances, most important first.
    #[must_use]
    pub fn importances(&self) -> &[RankedFeature] {
        &self.importances
    }

    /// Out-of-bag score, when enabled at fit time.
    #[must_use]
    pub fn oob_score(&self) -> Option<&OobScore> {
        self.oob_score.as_ref()
    }

    /// Training-set size, class balance and resolved split width.
    #[must_use]
    pub fn metadata(&self) -> &TrainingMetadata {
        &self.metadata
    }

    /// The fitted ensemble.
    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Procedure levels seen in training.
    #[must_use]
    pub fn mapping(&self) -> &CategoryMapping {
        &self.mapping
    }
}

impl RiskModel for ForestRiskModel {
    fn name(&self) -> &'static str {
        "random_forest"
    }

    fn predict_probability(&self, case: &Case) -> Result<f64, ModelError> {
        let row = forest_row(case, &self.mapping)?;
        Ok(self.forest.predict_proba(&row)?)
    }

    fn predict_probabilities(&self, cases: &[Case]) -> Result<Vec<f64>, ModelError> {
        let rows = cases
            .iter()
            .map(|c| forest_row(c, &self.mapping))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.forest.predict_proba_batch(&rows)?)
    }
}
