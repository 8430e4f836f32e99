#![doc = include_str!("../README.md")]

//! Kernel support-vector classifier training and evaluation.
//!
//! The crate is organized the way the optimization engine it implements is
//! organized: feature [`vector`] representations at the bottom, a cached
//! [`kernel`] evaluation layer above them, the numerically delicate
//! [`water`]-level solver used by the biased optimizers, and the family of
//! [`optimizer`] variants (SMO, Perceptron, SBP, Sparsifier) on top. [`rng`]
//! and [`numeric_sum`] are small supporting utilities shared by several
//! optimizers. [`dataset`] and [`model`] are the external I/O boundary:
//! parsing the text dataset format and encoding/decoding the model archive.

pub mod cli;
pub mod dataset;
pub mod errors;
pub mod kernel;
pub mod model;
pub mod numeric_sum;
pub mod optimizer;
pub mod rng;
pub mod support;
pub mod vector;
pub mod water;

/// Re-exports of the crate's primary traits and types for glob-importing
/// call sites (driver binaries, tests, benches).
pub mod prelude {
    pub use crate::dataset::{Dataset, parse_dataset, parse_prediction_vector};
    pub use crate::errors::{ConfigError, DatasetError, ModelError};
    pub use crate::kernel::{Kernel, KernelEngine, KernelKind};
    pub use crate::model::ModelArchive;
    pub use crate::numeric_sum::StableSum;
    pub use crate::optimizer::{
        Optimizer, perceptron::PerceptronBiased, perceptron::PerceptronUnbiased,
        sbp::SbpBiased, sbp::SbpUnbiased, smo::SmoBiased, smo::SmoUnbiased,
        sparsifier::SparsifierBiased, sparsifier::SparsifierUnbiased,
    };
    pub use crate::rng::{LaggedFibonacci4, LinearCongruential64, UniformSource};
    pub use crate::vector::{DenseVector, FeatureVector, SpanVector, SparseVector};
    pub use crate::water::{water_level_biased, water_level_unbiased};
}
