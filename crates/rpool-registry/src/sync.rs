//! Fetching of missing index artifacts.
//!
//! [`ensure_index`] is cheap when the artifact is already on disk. Only a
//! remote repository can be fetched; a local repository's artifact is left
//! for the deserializer to find or report as not found.

use std::{
    fs::{self, File},
    io,
    path::Path,
    time::Duration,
};

use rpool_utils::fs::{ensure_dir_exists, path_exists, safe_remove};
use tracing::debug;
use ureq::{http::header::CACHE_CONTROL, Agent};

use crate::{
    error::{ErrorContext, RegistryError, Result},
    location::{index_url, is_remote},
};

/// Downloads repository index files over HTTP(S)/FTP-capable transports.
#[derive(Clone)]
pub struct IndexFetcher {
    agent: Agent,
    index_file: String,
}

impl IndexFetcher {
    pub fn new(index_file: impl Into<String>, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .user_agent(concat!("rpool/", env!("CARGO_PKG_VERSION")))
            .build()
            .into();

        Self::from_agent(agent, index_file)
    }

    pub fn from_agent(agent: Agent, index_file: impl Into<String>) -> Self {
        Self {
            agent,
            index_file: index_file.into(),
        }
    }

    /// Downloads the index of the remote repository at `location` into `dest`.
    ///
    /// The body is streamed into `<dest>.part` and renamed into place once
    /// complete, so a failed transfer never leaves a truncated artifact.
    pub fn fetch(&self, location: &str, dest: &Path) -> Result<()> {
        let url = index_url(location, &self.index_file)?;

        if let Some(parent) = dest.parent() {
            ensure_dir_exists(parent)?;
        }

        debug!("Fetching index from {}", url);

        let resp = self
            .agent
            .get(url.as_str())
            .header(CACHE_CONTROL, "no-cache")
            .call()
            .map_err(|err| RegistryError::FailedToFetchRemote(format!("{url}: {err}")))?;

        if !resp.status().is_success() {
            return Err(RegistryError::FailedToFetchRemote(format!(
                "{url} [{}]",
                resp.status()
            )));
        }

        let tmp_path = format!("{}.part", dest.display());
        let result = File::create(&tmp_path)
            .with_context(|| format!("creating temporary file {tmp_path}"))
            .and_then(|mut tmp_file| {
                io::copy(&mut resp.into_body().into_reader(), &mut tmp_file)
                    .with_context(|| format!("writing index to {tmp_path}"))
            })
            .and_then(|_| {
                fs::rename(&tmp_path, dest)
                    .with_context(|| format!("moving {tmp_path} to {}", dest.display()))
            });

        if result.is_err() {
            let _ = safe_remove(&tmp_path);
        }

        result
    }
}

/// Makes sure the index artifact at `path` exists, fetching it from `location` if absent.
///
/// Anything already at `path` counts as present, even if it cannot be
/// loaded. Local repositories are never fetched.
///
/// # Errors
///
/// Returns [`RegistryError::FailedToFetchRemote`] (or a transport error) when
/// a remote artifact is absent and cannot be fetched.
pub fn ensure_index(fetcher: &IndexFetcher, path: &Path, location: &str) -> Result<()> {
    if path_exists(path) {
        return Ok(());
    }

    if !is_remote(location) {
        debug!("No index at {} for local repository {}", path.display(), location);
        return Ok(());
    }

    fetcher.fetch(location, path)
}
