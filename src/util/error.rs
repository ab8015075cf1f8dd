//! Error types for silmatch.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for silmatch operations.
pub type SilMatchResult<T> = std::result::Result<T, SilMatchError>;

/// Errors that can occur while building silhouettes, extracting corners or
/// classifying images.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SilMatchError {
    /// The source image could not be decoded or rasterized.
    #[error("cannot decode image {path:?}: {reason}")]
    ImageDecode { path: PathBuf, reason: String },
    /// No usable cache entry exists for the source; recompute.
    #[error("no fresh cache entry at {path:?}")]
    CacheMiss { path: PathBuf },
    /// A cache directory or file could not be created, read or written.
    #[error("cache I/O failed at {path:?}: {reason}")]
    CacheIo { path: PathBuf, reason: String },
    /// A debug artifact or training directory could not be written or read.
    #[error("I/O failed at {path:?}: {reason}")]
    ArtifactIo { path: PathBuf, reason: String },
    /// The configuration or a required startup path is invalid.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// An edge or corner detector failed.
    #[error("{stage} failed: {reason}")]
    Detector { stage: &'static str, reason: String },
}

impl SilMatchError {
    pub(crate) fn cache_io(path: impl Into<PathBuf>, err: impl ToString) -> Self {
        Self::CacheIo {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn artifact_io(path: impl Into<PathBuf>, err: impl ToString) -> Self {
        Self::ArtifactIo {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Returns true for the internal cache-miss signal.
    pub fn is_cache_miss(&self) -> bool {
        matches!(self, Self::CacheMiss { .. })
    }
}
