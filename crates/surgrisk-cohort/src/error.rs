/// Errors from cohort generation and partitioning.
#[derive(Debug, thiserror::Error)]
pub enum CohortError {
    /// Returned when the requested cohort size is zero.
    #[error("n_cases must be at least 1, got {n_cases}")]
    InvalidCaseCount {
        /// The invalid n_cases value provided.
        n_cases: usize,
    },

    /// Returned when the train fraction is not in the open interval (0.0, 1.0).
    #[error("train_fraction must be in (0.0, 1.0), got {fraction}")]
    InvalidTrainFraction {
        /// The invalid train_fraction value provided.
        fraction: f64,
    },

    /// Returned when partitioning a cohort with zero cases.
    #[error("cohort has zero cases")]
    EmptyCohort,

    /// Returned when a sampling distribution cannot be constructed.
    #[error("invalid {distribution} distribution parameters: {reason}")]
    Distribution {
        /// Name of the distribution that failed to build.
        distribution: &'static str,
        /// Human-readable description from the distribution library.
        reason: String,
    },
}
