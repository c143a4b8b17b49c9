use miette::Diagnostic;
use rpool_utils::error::{FileSystemError, PathError, UtilsError};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(rpool_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(rpool_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(rpool_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Invalid repository location at position {0}: location is empty")]
    #[diagnostic(
        code(rpool_config::invalid_repository),
        help("Each entry of `repositories` must be a local path or a remote URL")
    )]
    InvalidRepository(usize),

    #[error("Invalid fetch timeout: {0}")]
    #[diagnostic(
        code(rpool_config::invalid_fetch_timeout),
        help("Use a duration such as \"30s\", \"2m\" or \"1h\"")
    )]
    InvalidFetchTimeout(String),

    #[error("Invalid index file name: {0}")]
    #[diagnostic(
        code(rpool_config::invalid_index_file),
        help("The index file name must be a bare file name without `/`")
    )]
    InvalidIndexFile(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(rpool_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(rpool_config::utils))]
    Utils(#[from] UtilsError),
}

impl From<PathError> for ConfigError {
    fn from(err: PathError) -> Self {
        Self::Utils(UtilsError::Path(err))
    }
}

impl From<FileSystemError> for ConfigError {
    fn from(err: FileSystemError) -> Self {
        Self::Utils(UtilsError::FileSystem(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            ConfigError::InvalidRepository(2).to_string(),
            "Invalid repository location at position 2: location is empty"
        );
        assert_eq!(
            ConfigError::InvalidFetchTimeout("soon".into()).to_string(),
            "Invalid fetch timeout: soon"
        );
    }

    #[test]
    fn test_path_error_conversion() {
        let err = ConfigError::from(PathError::Empty);
        assert!(matches!(err, ConfigError::Utils(UtilsError::Path(_))));
        assert_eq!(err.to_string(), "Path is empty");
    }
}
