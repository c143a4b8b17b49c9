//! Error types for the registry crate.
//!
//! [`RegistryError`] covers both outcomes a pool build absorbs (a missing
//! index, a failed fetch) and the ones it propagates. [`RegistryError::is_not_found`]
//! and [`RegistryError::is_unsupported`] tell them apart.

use std::path::PathBuf;

use miette::Diagnostic;
use rpool_config::error::ConfigError;
use rpool_utils::error::{FileSystemError, PathError};
use thiserror::Error;

/// Errors that can occur while building or querying a repository pool.
#[derive(Error, Diagnostic, Debug)]
pub enum RegistryError {
    #[error("No usable repositories available")]
    #[diagnostic(
        code(rpool_registry::unsupported),
        help("Add repository locations matching this host to `repositories` in your config")
    )]
    Unsupported,

    #[error("Index file not found: {}", .path.display())]
    #[diagnostic(
        code(rpool_registry::index_not_found),
        help("Run `rpool sync` to fetch missing repository indexes")
    )]
    IndexNotFound { path: PathBuf },

    #[error("Invalid repository location: {0}")]
    #[diagnostic(
        code(rpool_registry::invalid_location),
        help("Use a local directory or an http(s)/ftp URL")
    )]
    InvalidLocation(String),

    #[error("Error while {action}: {source}")]
    #[diagnostic(code(rpool_registry::io))]
    IoError {
        action: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(rpool_registry::path))]
    Path(#[from] PathError),

    #[error(transparent)]
    #[diagnostic(code(rpool_registry::fs))]
    FileSystem(#[from] FileSystemError),

    #[error(transparent)]
    #[diagnostic(
        code(rpool_registry::http),
        help("Check your network connection and the repository URL")
    )]
    Ureq(#[from] ureq::Error),

    #[error("Failed to fetch from remote source: {0}")]
    #[diagnostic(
        code(rpool_registry::fetch_remote),
        help("Verify the repository URL is correct and accessible")
    )]
    FailedToFetchRemote(String),

    #[error(transparent)]
    #[diagnostic(
        code(rpool_registry::json),
        help("The index file may be corrupted or in an invalid format")
    )]
    Json(#[from] serde_json::Error),

    #[error("Index file is too short: {}", .path.display())]
    #[diagnostic(
        code(rpool_registry::index_too_short),
        help("The index file appears to be corrupted or incomplete")
    )]
    IndexTooShort { path: PathBuf },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    #[diagnostic(code(rpool_registry::custom))]
    Custom(String),
}

impl RegistryError {
    /// `true` for the benign "nothing to do" outcome of a pool build.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported)
    }

    /// `true` if the index artifact simply does not exist on disk.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::IndexNotFound { .. } => true,
            Self::IoError { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// A specialized Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Extension trait for adding context to I/O errors.
pub trait ErrorContext<T> {
    /// Adds context to an error, describing what action was being performed.
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            RegistryError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            RegistryError::Unsupported.to_string(),
            "No usable repositories available"
        );
        assert_eq!(
            RegistryError::IndexNotFound {
                path: PathBuf::from("/srv/repo/index.json.zst")
            }
            .to_string(),
            "Index file not found: /srv/repo/index.json.zst"
        );
        assert_eq!(
            RegistryError::InvalidLocation("http://".into()).to_string(),
            "Invalid repository location: http://"
        );
    }

    #[test]
    fn test_classification() {
        assert!(RegistryError::Unsupported.is_unsupported());
        assert!(!RegistryError::Unsupported.is_not_found());

        let not_found = RegistryError::IndexNotFound {
            path: PathBuf::from("/x"),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_unsupported());

        let io_not_found = io::Result::<()>::Err(io::ErrorKind::NotFound.into())
            .with_context(|| "opening index".into());
        assert!(io_not_found.unwrap_err().is_not_found());

        let denied = io::Result::<()>::Err(io::ErrorKind::PermissionDenied.into())
            .with_context(|| "opening index".into())
            .unwrap_err();
        assert!(!denied.is_not_found());
        assert!(denied.to_string().starts_with("Error while opening index"));

        assert!(!RegistryError::Custom("corrupt".into()).is_not_found());
    }
}
