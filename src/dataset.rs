//! Dataset and prediction-vector text format parsing (§6, C7).
//!
//! Dataset lines look like `label  [index:value]*  # trailing comment`,
//! fields separated by whitespace or commas. A feature token without an
//! explicit index inherits `previous_index + 1` (starting at 0); indices
//! must be strictly increasing within a line; a value of exactly `0` is
//! dropped rather than stored. Blank and comment-only lines are skipped.
//! Lines longer than [`MAX_LINE_BYTES`] are rejected rather than silently
//! truncated.

use std::io::BufRead;

use crate::errors::DatasetError;
use crate::vector::{FeatureVector, SparseVector};

/// The longest a single dataset or prediction-vector line may be.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// A parsed dataset: parallel vectors and labels, ready to hand to
/// [`crate::kernel::KernelEngine::new`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// One feature vector per example.
    pub vectors: Vec<FeatureVector>,
    /// One real-valued label per example; sign determines class.
    pub labels: Vec<f64>,
}

impl Dataset {
    /// The number of examples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the dataset has no examples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

fn strip_comment(line: &str) -> &str {
    let cut = line.find(['#', '%']).unwrap_or(line.len());
    line[..cut].trim()
}

fn parse_line(line: &str, line_number: usize) -> Result<Option<(f64, SparseVector)>, DatasetError> {
    let content = strip_comment(line);
    if content.is_empty() {
        return Ok(None);
    }

    let mut fields = content.split([' ', '\t', ',']).filter(|f| !f.is_empty());

    let label_text = fields.next().ok_or_else(|| DatasetError::InvalidLabel {
        line: line_number,
        text: String::new(),
    })?;
    let label: f64 = label_text.parse().map_err(|_| DatasetError::InvalidLabel {
        line: line_number,
        text: label_text.to_string(),
    })?;
    if !label.is_finite() || label == 0.0 {
        return Err(DatasetError::InvalidLabel { line: line_number, text: label_text.to_string() });
    }

    let mut vector = SparseVector::new();
    let mut next_index = 0usize;
    for token in fields {
        let (index, value_text) = match token.split_once(':') {
            Some((idx, val)) => {
                let idx: usize = idx.parse().map_err(|_| DatasetError::InvalidFeatureToken {
                    line: line_number,
                    text: token.to_string(),
                })?;
                (idx, val)
            }
            None => (next_index, token),
        };
        let value: f64 = value_text.parse().map_err(|_| DatasetError::InvalidFeatureToken {
            line: line_number,
            text: token.to_string(),
        })?;
        if !value.is_finite() {
            return Err(DatasetError::InvalidFeatureToken { line: line_number, text: token.to_string() });
        }
        if index < next_index {
            return Err(DatasetError::NonMonotoneIndex { line: line_number, index });
        }
        next_index = index + 1;
        if value != 0.0 {
            vector.append(index, value);
        }
    }

    Ok(Some((label, vector)))
}

/// Parses a dataset from any buffered byte stream, per §6's text format.
///
/// # Errors
///
/// Returns [`DatasetError`] on a read failure, an over-length line, or a
/// malformed label/feature token/index ordering.
pub fn parse_dataset<R: BufRead>(reader: R) -> Result<Dataset, DatasetError> {
    let mut dataset = Dataset::default();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.len() > MAX_LINE_BYTES {
            return Err(DatasetError::LineTooLong { line: line_number + 1 });
        }
        if let Some((label, sparse)) = parse_line(&line, line_number + 1)? {
            dataset.labels.push(label);
            dataset.vectors.push(FeatureVector::Sparse(sparse));
        }
    }
    Ok(dataset)
}

/// Parses a Sparsifier teacher-prediction vector: one value per non-blank
/// line, `#`/`%` comments to end-of-line, exactly `expected_len` values.
///
/// # Errors
///
/// Returns [`DatasetError`] on a read failure, a non-finite value, or a
/// length mismatch against `expected_len`.
pub fn parse_prediction_vector<R: BufRead>(
    reader: R,
    expected_len: usize,
) -> Result<Vec<f64>, DatasetError> {
    let mut values = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.len() > MAX_LINE_BYTES {
            return Err(DatasetError::LineTooLong { line: line_number + 1 });
        }
        let content = strip_comment(&line);
        if content.is_empty() {
            continue;
        }
        let value: f64 = content.parse().map_err(|_| DatasetError::InvalidPrediction {
            line: line_number + 1,
            text: content.to_string(),
        })?;
        if !value.is_finite() {
            return Err(DatasetError::InvalidPrediction {
                line: line_number + 1,
                text: content.to_string(),
            });
        }
        values.push(value);
    }
    if values.len() != expected_len {
        return Err(DatasetError::PredictionLengthMismatch {
            expected: expected_len,
            actual: values.len(),
        });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_explicit_and_implicit_indices() {
        let text = "+1 1:1.0 3.5\n-1 0:2.0 1:0 2:4.0\n";
        let dataset = parse_dataset(text.as_bytes()).unwrap();
        assert_eq!(dataset.labels, vec![1.0, -1.0]);
        assert_eq!(dataset.len(), 2);
        let FeatureVector::Sparse(v0) = &dataset.vectors[0] else { panic!("expected sparse") };
        assert_eq!(v0.entries(), &[(1, 1.0), (2, 3.5)]);
    }

    #[test]
    fn drops_zero_valued_features() {
        let dataset = parse_dataset("+1 0:0 1:5.0\n".as_bytes()).unwrap();
        let FeatureVector::Sparse(v) = &dataset.vectors[0] else { panic!("expected sparse") };
        assert_eq!(v.entries(), &[(1, 5.0)]);
    }

    #[test]
    fn skips_blank_and_comment_only_lines() {
        let text = "# header comment\n\n+1 1:1.0\n  % another comment\n-1 1:-1.0\n";
        let dataset = parse_dataset(text.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn rejects_non_monotone_indices() {
        let err = parse_dataset("+1 2:1.0 1:2.0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::NonMonotoneIndex { line: 1, index: 1 }));
    }

    #[test]
    fn rejects_invalid_label() {
        let err = parse_dataset("notanumber 1:1.0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidLabel { line: 1, .. }));
    }

    #[test]
    fn prediction_vector_requires_exact_length() {
        let text = "1.0\n# comment\n-1.0\n2.0\n";
        let values = parse_prediction_vector(text.as_bytes(), 3).unwrap();
        assert_eq!(values, vec![1.0, -1.0, 2.0]);
        assert!(matches!(
            parse_prediction_vector(text.as_bytes(), 2),
            Err(DatasetError::PredictionLengthMismatch { expected: 2, actual: 3 })
        ));
    }
}
