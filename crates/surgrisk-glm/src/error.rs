/// Errors from logistic regression fitting and prediction.
#[derive(Debug, thiserror::Error)]
pub enum GlmError {
    /// Returned when max_iter is zero.
    #[error("max_iter must be at least 1, got {max_iter}")]
    InvalidMaxIter {
        /// The invalid max_iter value provided.
        max_iter: usize,
    },

    /// Returned when the convergence tolerance is not a positive finite number.
    #[error("tol must be positive and finite, got {tol}")]
    InvalidTolerance {
        /// The invalid tolerance provided.
        tol: f64,
    },

    /// Returned when the confidence level is not in (0.0, 1.0).
    #[error("confidence_level must be in (0.0, 1.0), got {level}")]
    InvalidConfidenceLevel {
        /// The invalid confidence level provided.
        level: f64,
    },

    /// Returned when the training dataset has zero samples.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the training dataset has zero feature columns.
    #[error("training dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when every training label has the same value.
    #[error("all {n_samples} training labels are {label}; logistic fit is undefined")]
    SingleClass {
        /// The single label value present.
        label: bool,
        /// Number of training samples.
        n_samples: usize,
    },

    /// Returned when the label count differs from the sample count.
    #[error("got {n_labels} labels for {n_samples} samples")]
    LabelCountMismatch {
        /// Number of feature rows.
        n_samples: usize,
        /// Number of labels.
        n_labels: usize,
    },

    /// Returned when the number of feature names differs from the column count.
    #[error("got {n_names} feature names for {n_features} feature columns")]
    FeatureNameMismatch {
        /// Number of feature columns.
        n_features: usize,
        /// Number of names supplied.
        n_names: usize,
    },

    /// Returned when a sample has a different number of features than expected.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when a prediction input has the wrong number of features.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when the Fisher information matrix is not positive definite.
    #[error("information matrix is singular at iteration {iteration} (collinear or separated design)")]
    SingularInformation {
        /// IRLS iteration at which the factorization failed (0 = final covariance).
        iteration: usize,
    },

    /// Returned when the standard normal reference distribution cannot be built.
    #[error("normal reference distribution unavailable: {reason}")]
    Distribution {
        /// Human-readable description from the distribution library.
        reason: String,
    },
}
