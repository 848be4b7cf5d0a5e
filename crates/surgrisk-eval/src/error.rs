use surgrisk_model::ModelError;

/// Errors from holdout evaluation.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Returned when the test set has no cases.
    #[error("test set is empty")]
    EmptyTestSet,

    /// Returned when every test case has the same outcome, leaving one ROC axis undefined.
    #[error("all {n_cases} test cases have complication_30d = {outcome}; ROC is undefined")]
    SingleClassTest {
        /// The single outcome present.
        outcome: bool,
        /// Number of test cases.
        n_cases: usize,
    },

    /// Returned when the classification threshold is not in (0.0, 1.0).
    #[error("threshold must be in (0.0, 1.0), got {threshold}")]
    InvalidThreshold {
        /// The invalid threshold provided.
        threshold: f64,
    },

    /// Returned when the actual and predicted outcome slices differ in length.
    #[error("got {n_predicted} predictions for {n_actual} outcomes")]
    LengthMismatch {
        /// Number of actual outcomes.
        n_actual: usize,
        /// Number of predictions.
        n_predicted: usize,
    },

    /// Returned when a model emits a probability outside [0, 1] or NaN.
    #[error("case {case_index}: probability {value} is outside [0, 1]")]
    ProbabilityOutOfRange {
        /// Zero-based position in the test set.
        case_index: usize,
        /// The offending value.
        value: f64,
    },

    /// Wraps a scoring error from the model.
    #[error("scoring failed: {0}")]
    Model(#[from] ModelError),
}
