//! Model archive encoding and decoding (§6, C7).
//!
//! A [`ModelArchive`] is a versioned snapshot of everything needed to resume
//! training or serve predictions: the kernel's vectors, labels, kind, and
//! training size, plus the optimizer's `α`, `r`, iteration counter, and
//! hyperparameters. It is encoded with `bincode` (a compact, schema-stable
//! binary format already in the dependency graph) and optionally wrapped in
//! gzip via `flate2`, matching the "optional gzip wrapping is supported on
//! some entry points" note in §6.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::kernel::KernelKind;
use crate::vector::FeatureVector;

/// The archive format version this build writes and the oldest it reads.
pub const ARCHIVE_VERSION: u32 = 1;

/// Which of the eight optimizer variants produced an archive's state, plus
/// its hyperparameters and any variant-specific extra state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OptimizerState {
    /// Unbiased SMO: regularization `lambda`.
    SmoUnbiased {
        /// `λ`, the L2 regularization weight.
        lambda: f64,
    },
    /// Biased SMO: regularization `lambda`.
    SmoBiased {
        /// `λ`, the L2 regularization weight.
        lambda: f64,
    },
    /// Unbiased Perceptron: margin parameter `mu`.
    PerceptronUnbiased {
        /// The margin threshold scale.
        mu: f64,
    },
    /// Biased Perceptron: margin parameter `mu`.
    PerceptronBiased {
        /// The margin threshold scale.
        mu: f64,
    },
    /// Unbiased SBP: sampling rate `nu` plus the running accumulators
    /// behind its averaged classifier.
    SbpUnbiased {
        /// The per-iterate slack fraction.
        nu: f64,
        /// `Σₜ αₜ` per training index, materialized from each accumulator.
        sum_alpha: Vec<f64>,
        /// `Σₜ rₜ` per training index, materialized from each accumulator.
        sum_r: Vec<f64>,
    },
    /// Biased SBP: sampling rate `nu` plus the running accumulators behind
    /// its averaged classifier.
    SbpBiased {
        /// The per-iterate slack fraction.
        nu: f64,
        /// `Σₜ αₜ` per training index, materialized from each accumulator.
        sum_alpha: Vec<f64>,
        /// `Σₜ rₜ` per training index, materialized from each accumulator.
        sum_r: Vec<f64>,
    },
    /// Unbiased Sparsifier: teacher predictions and hyperparameters.
    SparsifierUnbiased {
        /// Teacher predictions `g[0..T)`.
        targets: Vec<f64>,
        /// Target norm budget `W²`.
        w_squared: f64,
        /// Step size `η`.
        eta: f64,
        /// Target sub-optimality `ε`.
        epsilon: f64,
    },
    /// Biased Sparsifier: teacher predictions and hyperparameters.
    SparsifierBiased {
        /// Teacher predictions `g[0..T)`.
        targets: Vec<f64>,
        /// Target norm budget `W²`.
        w_squared: f64,
        /// Step size `η`.
        eta: f64,
        /// Target sub-optimality `ε`.
        epsilon: f64,
    },
}

/// A versioned, self-contained snapshot of a kernel and optimizer's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArchive {
    version: u32,
    kernel_kind: KernelKind,
    vectors: Vec<FeatureVector>,
    labels: Vec<f64>,
    training_size: usize,
    cache_capacity: usize,
    alpha: Vec<f64>,
    r: Vec<f64>,
    iterations: u64,
    optimizer: OptimizerState,
}

impl ModelArchive {
    /// Builds an archive at the current [`ARCHIVE_VERSION`].
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kernel_kind: KernelKind,
        vectors: Vec<FeatureVector>,
        labels: Vec<f64>,
        training_size: usize,
        cache_capacity: usize,
        alpha: Vec<f64>,
        r: Vec<f64>,
        iterations: u64,
        optimizer: OptimizerState,
    ) -> Self {
        Self {
            version: ARCHIVE_VERSION,
            kernel_kind,
            vectors,
            labels,
            training_size,
            cache_capacity,
            alpha,
            r,
            iterations,
            optimizer,
        }
    }

    /// The kernel kind this archive was built with.
    #[must_use]
    pub fn kernel_kind(&self) -> KernelKind {
        self.kernel_kind
    }

    /// The stored feature vectors, training and validation.
    #[must_use]
    pub fn vectors(&self) -> &[FeatureVector] {
        &self.vectors
    }

    /// The stored labels.
    #[must_use]
    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    /// The training-set size.
    #[must_use]
    pub fn training_size(&self) -> usize {
        self.training_size
    }

    /// The row cache capacity the kernel was built with.
    #[must_use]
    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    /// The stored dual weights.
    #[must_use]
    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    /// The stored responses.
    #[must_use]
    pub fn r(&self) -> &[f64] {
        &self.r
    }

    /// The stored iteration counter.
    #[must_use]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// The optimizer variant and its hyperparameters.
    #[must_use]
    pub fn optimizer(&self) -> &OptimizerState {
        &self.optimizer
    }

    /// Encodes the archive as plain `bincode`, writing to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] on a write failure.
    pub fn write<W: Write>(&self, writer: W) -> Result<(), ModelError> {
        bincode::serialize_into(writer, self).map_err(|e| match *e {
            bincode::ErrorKind::Io(io) => ModelError::Io(io),
            other => ModelError::Corrupt(Box::new(other)),
        })
    }

    /// Encodes the archive gzip-wrapped, writing to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] on a write failure.
    pub fn write_gzip<W: Write>(&self, writer: W) -> Result<(), ModelError> {
        let mut encoder = flate2::write::GzEncoder::new(writer, flate2::Compression::default());
        self.write(&mut encoder)?;
        encoder.finish()?;
        Ok(())
    }

    /// Decodes a plain `bincode` archive from `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if the stream cannot be read, does not decode
    /// as a valid archive, or carries an unsupported version.
    pub fn read<R: Read>(reader: R) -> Result<Self, ModelError> {
        let archive: Self = bincode::deserialize_from(reader)?;
        if archive.version > ARCHIVE_VERSION {
            return Err(ModelError::UnsupportedVersion {
                expected: ARCHIVE_VERSION,
                found: archive.version,
            });
        }
        Ok(archive)
    }

    /// Decodes a gzip-wrapped archive from `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] under the same conditions as [`Self::read`],
    /// plus a decompression failure.
    pub fn read_gzip<R: Read>(reader: R) -> Result<Self, ModelError> {
        let decoder = flate2::read::GzDecoder::new(reader);
        Self::read(decoder)
    }
}
