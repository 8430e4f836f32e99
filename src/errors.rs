//! Error types for the crate's configuration, dataset, and model I/O
//! boundaries.
//!
//! Per the taxonomy this crate follows: configuration errors and I/O errors
//! are surfaced as [`Result`] and bubble to the driver with a human-readable
//! message; precondition violations (non-monotone index during
//! [`crate::vector::FeatureVector::append`], scaling by zero, out-of-range
//! access) are programmer bugs and remain `panic!`-backed, never routed
//! through these types.

mod config;
mod dataset;
mod model;

pub use config::ConfigError;
pub use dataset::DatasetError;
pub use model::ModelError;
