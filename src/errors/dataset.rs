//! Errors raised while parsing the dataset and prediction-vector text
//! formats (§6).

/// Errors raised while parsing a dataset line, a full dataset, or a
/// prediction-vector file.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// Reading the underlying stream failed.
    #[error("I/O error reading dataset: {0}")]
    Io(#[from] std::io::Error),
    /// A line exceeded the 1 MiB limit named in §6.
    #[error("line {line} exceeds the 1 MiB limit")]
    LineTooLong {
        /// 1-based line number.
        line: usize,
    },
    /// A line's label field was missing or not a finite, nonzero number.
    #[error("line {line}: invalid label {text:?}")]
    InvalidLabel {
        /// 1-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },
    /// A feature's `index:value` token was malformed.
    #[error("line {line}: invalid feature token {text:?}")]
    InvalidFeatureToken {
        /// 1-based line number.
        line: usize,
        /// The offending token.
        text: String,
    },
    /// Feature indices within a line must be strictly increasing.
    #[error("line {line}: feature index {index} is not strictly greater than the previous index")]
    NonMonotoneIndex {
        /// 1-based line number.
        line: usize,
        /// The offending index.
        index: usize,
    },
    /// A prediction-vector entry was not a finite number.
    #[error("line {line}: invalid prediction value {text:?}")]
    InvalidPrediction {
        /// 1-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },
    /// The prediction vector did not contain exactly the expected number of
    /// values.
    #[error("prediction vector has {actual} values, expected {expected}")]
    PredictionLengthMismatch {
        /// Expected length (training size).
        expected: usize,
        /// Actual number of values read.
        actual: usize,
    },
}
