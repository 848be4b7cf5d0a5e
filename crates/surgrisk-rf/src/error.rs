/// Errors from forest configuration, training and prediction.
#[derive(Debug, thiserror::Error)]
pub enum RfError {
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount { n_trees: usize },

    #[error("max_depth must be at least 1, got {max_depth}")]
    InvalidMaxDepth { max_depth: usize },

    #[error("min_samples_split must be at least 2, got {min_samples_split}")]
    InvalidMinSamplesSplit { min_samples_split: usize },

    #[error("min_samples_leaf must be at least 1, got {min_samples_leaf}")]
    InvalidMinSamplesLeaf { min_samples_leaf: usize },

    /// `max_features` resolved outside `1..=n_features`.
    #[error("max_features resolved to {max_features}, but must be in [1, {n_features}]")]
    InvalidMaxFeatures {
        max_features: usize,
        n_features: usize,
    },

    /// Bootstrap draw size as a fraction of the training set, outside (0, 1].
    #[error("bootstrap_fraction must be in (0.0, 1.0], got {fraction}")]
    InvalidBootstrapFraction { fraction: f64 },

    #[error("training dataset has zero samples")]
    EmptyDataset,

    #[error("training dataset has zero feature columns")]
    ZeroFeatures,

    #[error("got {n_labels} labels for {n_samples} samples")]
    LabelCountMismatch { n_samples: usize, n_labels: usize },

    #[error("got {n_names} feature names for {n_features} feature columns")]
    FeatureNameMismatch { n_features: usize, n_names: usize },

    /// A training row is shorter or longer than the first row.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        expected: usize,
        got: usize,
        /// Zero-based row of the offending sample.
        sample_index: usize,
    },

    /// A row passed for scoring has the wrong width.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch { expected: usize, got: usize },

    /// NaN or infinity in the training rows.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        sample_index: usize,
        feature_index: usize,
    },

    /// Every training sample landed in every bootstrap draw.
    #[error("OOB evaluation failed: {reason}")]
    OobEvaluationFailed { reason: String },
}
