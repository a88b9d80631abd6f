//! Crate-level error type.
//!
//! Subsystems report their own `thiserror` enums ([`CatalogError`],
//! [`ResolveError`], [`ConfigError`]); [`Error`] wraps them for callers that
//! mix file access with resolution. The CLI converts everything to `anyhow`.

use std::path::PathBuf;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::resolve::ResolveError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Tags or audio properties could not be read
    #[error("Cannot read tags of {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    #[error("No such file: {0}")]
    NotFound(PathBuf),
}

impl Error {
    pub fn metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_error_names_file() {
        let msg = Error::metadata("/music/song.mp3", "unsupported format").to_string();
        assert_eq!(msg, "Cannot read tags of /music/song.mp3: unsupported format");
    }

    #[test]
    fn test_subsystem_errors_convert() {
        let err: Error = ResolveError::Ambiguous { best_score: 42 }.into();
        assert!(matches!(err, Error::Resolve(_)));
        assert!(err.to_string().contains("42"));

        let err: Error = CatalogError::RateLimited.into();
        assert!(matches!(err, Error::Catalog(CatalogError::RateLimited)));
    }
}
