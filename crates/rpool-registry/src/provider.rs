//! The collaborators a pool build depends on.
//!
//! [`IndexProvider`] bundles the three operations a pool needs per location:
//! resolving the artifact path, making sure the artifact is present and
//! deserializing it. The pool only relies on their error signaling, so tests
//! and embedders can swap the standard implementation out.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use rpool_config::config::Config;

use crate::{
    error::{RegistryError, Result},
    index::{load_index, RepositoryIndex},
    location::{index_path, is_remote},
    sync::{ensure_index, IndexFetcher},
};

pub trait IndexProvider {
    /// Local path of the cached index artifact for `location`.
    ///
    /// A failure here aborts the whole build.
    fn index_path(&self, location: &str) -> Result<PathBuf>;

    /// Makes sure the artifact at `path` exists, fetching it from `location` if absent.
    ///
    /// A failure here only marks `location` as missing.
    fn ensure_index(&self, path: &Path, location: &str) -> Result<()>;

    /// Deserializes the artifact at `path`.
    ///
    /// An error for which [`RegistryError::is_not_found`] holds marks the
    /// location as missing; any other error aborts the whole build.
    fn load_index(&self, path: &Path) -> Result<RepositoryIndex>;
}

/// Index provider backed by the filesystem and an HTTP fetcher.
#[derive(Clone)]
pub struct StandardIndexProvider {
    metadata_dir: PathBuf,
    index_file: String,
    fetcher: IndexFetcher,
}

impl StandardIndexProvider {
    pub fn new(metadata_dir: impl Into<PathBuf>, index_file: &str, timeout: Duration) -> Self {
        Self::with_fetcher(
            metadata_dir,
            index_file,
            IndexFetcher::new(index_file, timeout),
        )
    }

    pub fn with_fetcher(
        metadata_dir: impl Into<PathBuf>,
        index_file: &str,
        fetcher: IndexFetcher,
    ) -> Self {
        Self {
            metadata_dir: metadata_dir.into(),
            index_file: index_file.to_string(),
            fetcher,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.get_metadata_path()?,
            config.index_file(),
            config.fetch_timeout(),
        ))
    }

    pub fn metadata_dir(&self) -> &Path {
        &self.metadata_dir
    }

    /// Downloads a fresh copy of a remote repository's index, replacing any cached one.
    ///
    /// Returns the artifact path.
    pub fn refresh(&self, location: &str) -> Result<PathBuf> {
        if !is_remote(location) {
            return Err(RegistryError::InvalidLocation(format!(
                "{location}: only remote repositories can be synced"
            )));
        }

        let path = self.index_path(location)?;
        self.fetcher.fetch(location, &path)?;
        Ok(path)
    }
}

impl IndexProvider for StandardIndexProvider {
    fn index_path(&self, location: &str) -> Result<PathBuf> {
        index_path(location, &self.metadata_dir, &self.index_file)
    }

    fn ensure_index(&self, path: &Path, location: &str) -> Result<()> {
        ensure_index(&self.fetcher, path, location)
    }

    fn load_index(&self, path: &Path) -> Result<RepositoryIndex> {
        load_index(path)
    }
}
