//! Errors raised while validating kernel/optimizer configuration.

/// Errors raised at kernel or optimizer construction time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The named kernel is not one of `linear` or `gaussian`.
    #[error("unknown kernel \"{0}\", expected \"linear\" or \"gaussian\"")]
    UnknownKernel(String),
    /// The named optimizer is not one of the eight supported variants.
    #[error("unknown optimizer \"{0}\", expected one of smo, perceptron, sbp, sparsifier")]
    UnknownOptimizer(String),
    /// A kernel or optimizer was given the wrong number of hyperparameters.
    #[error("{name} expects {expected} parameter(s), got {actual}")]
    WrongParameterCount {
        /// The kernel or optimizer name.
        name: &'static str,
        /// The number of parameters expected.
        expected: usize,
        /// The number of parameters actually supplied.
        actual: usize,
    },
    /// A hyperparameter that must be strictly positive was not.
    #[error("{name} must be strictly positive, got {value}")]
    NonPositiveParameter {
        /// The hyperparameter's name.
        name: &'static str,
        /// The offending value.
        value: f64,
    },
    /// The dataset's vector count did not match its label count.
    #[error("dataset has {vectors} vectors but {labels} labels")]
    VectorLabelCountMismatch {
        /// Number of vectors in the dataset.
        vectors: usize,
        /// Number of labels in the dataset.
        labels: usize,
    },
    /// The requested training size exceeds the dataset's total size.
    #[error("training size {training} exceeds dataset size {total}")]
    TrainingSizeExceedsDataset {
        /// Requested training count.
        training: usize,
        /// Total number of examples in the dataset.
        total: usize,
    },
    /// The Sparsifier's target-prediction vector did not have exactly `T`
    /// entries.
    #[error("target prediction vector has {actual} entries, expected {expected} (training size)")]
    TargetPredictionLengthMismatch {
        /// Expected length (training size).
        expected: usize,
        /// Actual length read.
        actual: usize,
    },
}
