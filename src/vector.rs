//! Feature vector representations (C1).
//!
//! A [`FeatureVector`] is one of three variants — [`SparseVector`],
//! [`SpanVector`], [`DenseVector`] — all semantically equal when interpreted
//! as an infinite zero-extended vector. [`norm_squared`](FeatureVector::norm_squared)
//! and [`inner_product`](FeatureVector::inner_product) agree across all
//! representations; which representation a training vector is stored as is
//! chosen by [`FeatureVector::from_sparse_entries`] using a total-footprint
//! heuristic (§9 "Storage representation ... chosen at construction by a
//! cost heuristic").

mod dense;
mod span;
mod sparse;

pub use dense::DenseVector;
pub use span::{DEFAULT_SKIP, SpanVector};
pub use sparse::SparseVector;

/// A feature vector, represented as whichever of the three storage forms is
/// most compact for its data.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum FeatureVector {
    /// Ordered `(index, value)` pairs.
    Sparse(SparseVector),
    /// Ordered `(startIndex, values)` runs.
    Span(SpanVector),
    /// A contiguous array starting at index 0.
    Dense(DenseVector),
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::Sparse(SparseVector::new())
    }
}

impl FeatureVector {
    /// The index just past the last stored nonzero/run/cell.
    #[must_use]
    pub fn dimension(&self) -> usize {
        match self {
            Self::Sparse(v) => v.dimension(),
            Self::Span(v) => v.dimension(),
            Self::Dense(v) => v.dimension(),
        }
    }

    /// Σ vᵢ², identical across all three representations.
    #[must_use]
    pub fn norm_squared(&self) -> f64 {
        match self {
            Self::Sparse(v) => v.norm_squared(),
            Self::Span(v) => v.norm_squared(),
            Self::Dense(v) => v.norm_squared(),
        }
    }

    /// Scales every stored value by `s`. O(nnz). A zero scale clears a
    /// sparse or span vector.
    pub fn scale(&mut self, s: f64) {
        match self {
            Self::Sparse(v) => v.scale(s),
            Self::Span(v) => v.scale(s),
            Self::Dense(v) => v.scale(s),
        }
    }

    /// Appends `(index, value)`. `index` must be strictly greater than the
    /// last stored index. A zero value is dropped by sparse/span storage.
    ///
    /// # Panics
    ///
    /// Panics on a non-monotone index — a precondition violation (§4.1).
    pub fn append(&mut self, index: usize, value: f64) {
        match self {
            Self::Sparse(v) => v.append(index, value),
            Self::Span(v) => v.append(index, value),
            Self::Dense(v) => v.append(index, value),
        }
    }

    /// `innerProduct(u, v) = Σ uᵢ vᵢ`, computed with a merge walk
    /// (sparse×sparse), an interval walk (sparse×span, span×span), or a
    /// direct indexed loop (dense×anything) — all nine pair combinations
    /// agree by construction.
    #[must_use]
    pub fn inner_product(&self, other: &Self) -> f64 {
        match (self, other) {
            (Self::Sparse(a), Self::Sparse(b)) => a.inner_product_sparse(b),
            (Self::Sparse(a), Self::Span(b)) | (Self::Span(b), Self::Sparse(a)) => {
                b.inner_product_sparse(a.entries())
            }
            (Self::Sparse(a), Self::Dense(b)) | (Self::Dense(b), Self::Sparse(a)) => {
                a.inner_product_dense(b.values())
            }
            (Self::Span(a), Self::Span(b)) => a.inner_product_span(b),
            (Self::Span(a), Self::Dense(b)) | (Self::Dense(b), Self::Span(a)) => {
                a.inner_product_dense(b.values())
            }
            (Self::Dense(a), Self::Dense(b)) => a.inner_product_dense(b.values()),
        }
    }

    /// Converts to the dense representation, materializing implicit zeros.
    #[must_use]
    pub fn to_dense(&self) -> DenseVector {
        let mut values = vec![0.0; self.dimension()];
        match self {
            Self::Sparse(v) => {
                for &(i, x) in v.entries() {
                    values[i] = x;
                }
            }
            Self::Span(v) => {
                for (start, run) in v.runs() {
                    values[*start..*start + run.len()].copy_from_slice(run);
                }
            }
            Self::Dense(v) => return v.clone(),
        }
        DenseVector::from_values(values)
    }

    /// Converts to the sparse representation, dropping implicit/explicit
    /// zeros.
    #[must_use]
    pub fn to_sparse(&self) -> SparseVector {
        match self {
            Self::Sparse(v) => v.clone(),
            Self::Span(v) => SparseVector::from_entries(
                v.runs()
                    .iter()
                    .flat_map(|(start, run)| {
                        run.iter().enumerate().filter(|&(_, &x)| x != 0.0).map(
                            move |(offset, &x)| (start + offset, x),
                        )
                    })
                    .collect(),
            ),
            Self::Dense(v) => SparseVector::from_entries(
                v.values().iter().enumerate().filter(|&(_, &x)| x != 0.0).map(|(i, &x)| (i, x)).collect(),
            ),
        }
    }

    /// Converts to the span representation, coalescing gaps of at most
    /// `skip` implicit zeros into a single padded run.
    #[must_use]
    pub fn to_span(&self, skip: usize) -> SpanVector {
        SpanVector::from_sparse_entries(&self.to_sparse().entries, skip)
    }

    /// Builds the representation with the smallest total in-memory
    /// footprint for the given sorted, strictly-increasing, nonzero
    /// `(index, value)` entries — sparse stores two words per entry, span
    /// stores one word per run header plus one word per cell (including
    /// padding), dense stores one word per cell from index 0 to the last
    /// stored index.
    #[must_use]
    pub fn from_sparse_entries(entries: Vec<(usize, f64)>) -> Self {
        if entries.is_empty() {
            return Self::Sparse(SparseVector::new());
        }
        let dimension = entries.last().map_or(0, |&(i, _)| i + 1);
        let sparse_words = entries.len() * 2;
        let span = SpanVector::from_sparse_entries(&entries, DEFAULT_SKIP);
        let span_words: usize = span.runs().iter().map(|(_, v)| 1 + v.len()).sum();
        let dense_words = dimension;

        if dense_words <= sparse_words && dense_words <= span_words {
            let mut values = vec![0.0; dimension];
            for (i, v) in &entries {
                values[*i] = *v;
            }
            Self::Dense(DenseVector::from_values(values))
        } else if span_words <= sparse_words {
            Self::Span(span)
        } else {
            Self::Sparse(SparseVector::from_entries(entries))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_round_trip_sparse_dense_sparse() {
        let original = SparseVector::from_entries(vec![(0, 1.0), (3, 2.0), (9, 3.0)]);
        let fv = FeatureVector::Sparse(original.clone());
        let dense = fv.to_dense();
        let round_tripped = FeatureVector::Dense(dense).to_sparse();
        assert_eq!(round_tripped.entries(), original.entries());
    }

    #[test]
    fn inner_product_symmetric_across_all_nine_combinations() {
        let entries_a = vec![(0, 1.0), (2, 2.0), (5, 3.0)];
        let entries_b = vec![(0, 4.0), (1, 5.0), (2, 6.0), (5, 7.0)];

        let a_sparse = FeatureVector::Sparse(SparseVector::from_entries(entries_a.clone()));
        let a_span = FeatureVector::Span(SpanVector::from_sparse_entries(&entries_a, 10));
        let a_dense = FeatureVector::Dense(a_sparse.to_dense());

        let b_sparse = FeatureVector::Sparse(SparseVector::from_entries(entries_b.clone()));
        let b_span = FeatureVector::Span(SpanVector::from_sparse_entries(&entries_b, 10));
        let b_dense = FeatureVector::Dense(b_sparse.to_dense());

        let expected = a_sparse.inner_product(&b_sparse);
        for a in [&a_sparse, &a_span, &a_dense] {
            for b in [&b_sparse, &b_span, &b_dense] {
                assert_eq!(a.inner_product(b), expected, "mismatch for {a:?} · {b:?}");
                assert_eq!(b.inner_product(a), expected, "asymmetry for {b:?} · {a:?}");
            }
        }
    }

    #[test]
    fn norm_squared_agrees_across_representations() {
        let entries = vec![(0, 3.0), (4, 4.0), (10, 0.5)];
        let sparse = FeatureVector::Sparse(SparseVector::from_entries(entries.clone()));
        let span = FeatureVector::Span(SpanVector::from_sparse_entries(&entries, 2));
        let dense = FeatureVector::Dense(sparse.to_dense());
        let expected = 9.0 + 16.0 + 0.25;
        assert_eq!(sparse.norm_squared(), expected);
        assert_eq!(span.norm_squared(), expected);
        assert_eq!(dense.norm_squared(), expected);
    }

    #[test]
    fn heuristic_picks_dense_for_nearly_full_vectors() {
        let entries: Vec<(usize, f64)> = (0..10).map(|i| (i, 1.0)).collect();
        match FeatureVector::from_sparse_entries(entries) {
            FeatureVector::Dense(_) => {}
            other => panic!("expected dense representation, got {other:?}"),
        }
    }

    #[test]
    fn heuristic_picks_sparse_for_widely_spaced_entries() {
        let entries = vec![(0, 1.0), (1000, 1.0)];
        match FeatureVector::from_sparse_entries(entries) {
            FeatureVector::Sparse(_) => {}
            other => panic!("expected sparse representation, got {other:?}"),
        }
    }
}
