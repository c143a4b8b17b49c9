use std::{
    fs,
    path::PathBuf,
    sync::{LazyLock, RwLock},
    time::Duration,
};

use rpool_utils::{
    path::{resolve_path, xdg_config_home, xdg_data_home},
    time::parse_duration,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, Result};

pub const DEFAULT_INDEX_FILE: &str = "index.json.zst";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Application's configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Ordered list of repository locations (local paths or remote URLs).
    /// Earlier entries take precedence when resolving packages.
    #[serde(default)]
    pub repositories: Vec<String>,

    /// Directory where index files of remote repositories are cached.
    /// Default: $RPOOL_ROOT/repos
    pub metadata_path: Option<String>,

    /// File name of a repository's index, both on disk and on the remote.
    /// Default: index.json.zst
    pub index_file: Option<String>,

    /// Timeout for fetching a missing remote index (e.g. "30s", "2m").
    /// Default: 30s
    pub fetch_timeout: Option<String>,
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("RPOOL_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("rpool").join("config.toml"),
    })
});

/// Loads the configuration file into the process-wide handle.
pub fn init() -> Result<()> {
    let config = Config::new()?;
    let mut global_config = CONFIG.write().unwrap();
    *global_config = Some(config);
    Ok(())
}

/// Returns a snapshot of the process-wide configuration, falling back to defaults.
pub fn get_config() -> Config {
    {
        let config_guard = CONFIG.read().unwrap();
        if let Some(config) = config_guard.as_ref() {
            return config.clone();
        }
    }

    let mut config_guard = CONFIG.write().unwrap();
    config_guard.get_or_insert_with(Config::default_config).clone()
}

/// Hands the ordered repository list over to the caller.
///
/// The process-wide configuration no longer holds the list afterwards; a
/// repository pool takes it as its input.
pub fn take_repositories() -> Vec<String> {
    let mut config_guard = CONFIG.write().unwrap();
    config_guard
        .get_or_insert_with(Config::default_config)
        .take_repositories()
}

fn root_path() -> String {
    std::env::var("RPOOL_ROOT")
        .unwrap_or_else(|_| format!("{}/rpool", xdg_data_home().display()))
}

impl Config {
    pub fn default_config() -> Self {
        Self {
            repositories: Vec::new(),
            metadata_path: Some(format!("{}/repos", root_path())),
            index_file: Some(DEFAULT_INDEX_FILE.to_string()),
            fetch_timeout: Some("30s".to_string()),
        }
    }

    /// Creates a new configuration by loading it from the configuration file.
    /// If the configuration file is not found, it uses the default configuration.
    pub fn new() -> Result<Self> {
        let config_path = CONFIG_PATH.read().unwrap().to_path_buf();

        let mut config = match fs::read_to_string(&config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    "no config file at {}, using defaults",
                    config_path.display()
                );
                Self::default_config()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    pub fn resolve(&mut self) -> Result<()> {
        if let Some(position) = self
            .repositories
            .iter()
            .position(|location| location.trim().is_empty())
        {
            return Err(ConfigError::InvalidRepository(position));
        }

        if let Some(ref index_file) = self.index_file {
            if index_file.is_empty() || index_file.contains('/') {
                return Err(ConfigError::InvalidIndexFile(index_file.clone()));
            }
        }

        if let Some(ref timeout) = self.fetch_timeout {
            if parse_duration(timeout).is_none() {
                return Err(ConfigError::InvalidFetchTimeout(timeout.clone()));
            }
        }

        self.index_file
            .get_or_insert_with(|| DEFAULT_INDEX_FILE.to_string());

        Ok(())
    }

    pub fn get_metadata_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("RPOOL_METADATA") {
            return Ok(resolve_path(&env_path)?);
        }
        if let Some(metadata_path) = &self.metadata_path {
            return Ok(resolve_path(metadata_path)?);
        }
        Ok(resolve_path(&root_path())?.join("repos"))
    }

    pub fn index_file(&self) -> &str {
        self.index_file.as_deref().unwrap_or(DEFAULT_INDEX_FILE)
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
            .as_deref()
            .and_then(parse_duration)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn take_repositories(&mut self) -> Vec<String> {
        std::mem::take(&mut self.repositories)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = CONFIG_PATH.read().unwrap().to_path_buf();
        let serialized = toml::to_string_pretty(self)?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&config_path, serialized)?;
        info!("Configuration saved to {}", config_path.display());
        Ok(())
    }
}

pub fn generate_default_config() -> Result<()> {
    let config_path = CONFIG_PATH.read().unwrap().to_path_buf();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    Config::default_config().save()?;
    info!(
        "Default configuration file generated at: {}",
        config_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;
    use tempfile::tempdir;

    use super::*;
    use crate::test_utils::with_env;

    fn with_config_path<F: FnOnce(PathBuf)>(f: F) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rpool").join("config.toml");
        let previous = std::mem::replace(&mut *CONFIG_PATH.write().unwrap(), path.clone());
        f(path);
        *CONFIG_PATH.write().unwrap() = previous;
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_config();

        assert!(config.repositories.is_empty());
        assert_eq!(config.index_file(), "index.json.zst");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert!(config.metadata_path.unwrap().ends_with("/repos"));
    }

    #[test]
    fn test_parse_ordered_repositories() {
        let config: Config = toml::from_str(
            r#"
            repositories = [
                "https://repo.example.org/current/x86_64",
                "/srv/local/noarch",
                "https://repo.example.org/current/x86_64",
            ]
            "#,
        )
        .unwrap();

        assert_eq!(
            config.repositories,
            vec![
                "https://repo.example.org/current/x86_64",
                "/srv/local/noarch",
                "https://repo.example.org/current/x86_64",
            ]
        );
        assert!(config.index_file.is_none());
        assert_eq!(config.index_file(), DEFAULT_INDEX_FILE);
    }

    #[test]
    fn test_resolve_rejects_blank_location() {
        let mut config = Config::default_config();
        config.repositories = vec!["/srv/repo/noarch".into(), "   ".into()];

        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidRepository(1))
        ));
    }

    #[test]
    fn test_resolve_keeps_duplicate_locations() {
        let mut config = Config::default_config();
        config.repositories = vec!["/srv/a/noarch".into(), "/srv/a/noarch".into()];

        config.resolve().unwrap();
        assert_eq!(config.repositories.len(), 2);
    }

    #[test]
    fn test_resolve_rejects_bad_timeout_and_index_file() {
        let mut config = Config::default_config();
        config.fetch_timeout = Some("whenever".into());
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidFetchTimeout(_))
        ));

        let mut config = Config::default_config();
        config.index_file = Some("nested/index.json".into());
        assert!(matches!(
            config.resolve(),
            Err(ConfigError::InvalidIndexFile(_))
        ));
    }

    #[test]
    fn test_resolve_fills_index_file() {
        let mut config = Config::default_config();
        config.index_file = None;
        config.resolve().unwrap();
        assert_eq!(config.index_file.as_deref(), Some(DEFAULT_INDEX_FILE));
    }

    #[test]
    fn test_take_repositories() {
        let mut config = Config::default_config();
        config.repositories = vec!["/srv/a/noarch".into(), "/srv/b/noarch".into()];

        let taken = config.take_repositories();
        assert_eq!(taken.len(), 2);
        assert!(config.repositories.is_empty());
        assert!(config.take_repositories().is_empty());
    }

    #[test]
    #[serial]
    fn test_metadata_path_env_override() {
        with_env(vec![("RPOOL_METADATA", "/custom/metadata")], || {
            let config = Config::default_config();
            assert_eq!(
                config.get_metadata_path().unwrap(),
                PathBuf::from("/custom/metadata")
            );
        });
    }

    #[test]
    #[serial]
    fn test_metadata_path_from_root() {
        std::env::remove_var("RPOOL_METADATA");
        with_env(vec![("RPOOL_ROOT", "/opt/rpool")], || {
            let mut config = Config::default_config();
            assert_eq!(
                config.get_metadata_path().unwrap(),
                PathBuf::from("/opt/rpool/repos")
            );

            config.metadata_path = None;
            assert_eq!(
                config.get_metadata_path().unwrap(),
                PathBuf::from("/opt/rpool/repos")
            );
        });
    }

    #[test]
    #[serial]
    fn test_new_without_file_uses_defaults() {
        with_config_path(|path| {
            assert!(!path.exists());
            let config = Config::new().unwrap();
            assert!(config.repositories.is_empty());
        });
    }

    #[test]
    #[serial]
    fn test_generate_default_config_and_reload() {
        with_config_path(|path| {
            generate_default_config().unwrap();
            assert!(path.exists());

            assert!(matches!(
                generate_default_config(),
                Err(ConfigError::ConfigAlreadyExists)
            ));

            let mut config = Config::new().unwrap();
            config.repositories.push("/srv/repo/noarch".into());
            config.save().unwrap();

            let reloaded = Config::new().unwrap();
            assert_eq!(reloaded.repositories, vec!["/srv/repo/noarch"]);
        });
    }

    #[test]
    #[serial]
    fn test_global_take_repositories() {
        {
            let mut global = CONFIG.write().unwrap();
            let mut config = Config::default_config();
            config.repositories = vec!["/srv/a/noarch".into()];
            *global = Some(config);
        }

        assert_eq!(get_config().repositories.len(), 1);
        assert_eq!(take_repositories(), vec!["/srv/a/noarch"]);
        assert!(get_config().repositories.is_empty());

        *CONFIG.write().unwrap() = None;
    }
}
