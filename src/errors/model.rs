//! Errors raised while encoding or decoding a model archive (§6).

/// Errors raised by [`crate::model::ModelArchive`] encode/decode.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Reading or writing the underlying stream failed.
    #[error("I/O error on model archive: {0}")]
    Io(#[from] std::io::Error),
    /// The archive's bytes did not decode as a valid `ModelArchive`.
    #[error("corrupted model archive: {0}")]
    Corrupt(#[from] Box<bincode::ErrorKind>),
    /// The archive's version tag is newer than this build understands.
    #[error("model archive version {found} is not supported (expected {expected})")]
    UnsupportedVersion {
        /// The version this build can read.
        expected: u32,
        /// The version found in the archive.
        found: u32,
    },
}
