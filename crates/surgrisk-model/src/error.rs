use surgrisk_cohort::ProcedureType;
use surgrisk_glm::GlmError;
use surgrisk_rf::RfError;

/// Errors from fitting or scoring a risk model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Returned when the training set has no cases.
    #[error("training set is empty")]
    EmptyTrainingSet,

    /// Returned when every training case has the same outcome.
    #[error("all {n_cases} training cases have complication_30d = {outcome}; risk model is undefined")]
    DegenerateOutcome {
        /// The single outcome present.
        outcome: bool,
        /// Number of training cases.
        n_cases: usize,
    },

    /// Returned when a scored case has a procedure level absent from training.
    #[error("procedure \"{procedure}\" was not present in the training set")]
    UnseenCategory {
        /// The unseen procedure level.
        procedure: ProcedureType,
    },

    /// Wraps a logistic regression error.
    #[error("logistic regression: {0}")]
    Glm(#[from] GlmError),

    /// Wraps a random forest error.
    #[error("random forest: {0}")]
    Rf(#[from] RfError),
}
