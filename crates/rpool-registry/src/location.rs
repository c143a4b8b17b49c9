//! Mapping from repository locations to their local index artifacts.
//!
//! Remote repositories are cached below the metadata directory in a folder
//! named after the sanitized host and path; local repositories carry their
//! index inside the repository directory itself.

use std::path::{Path, PathBuf};

use rpool_utils::path::resolve_path;
use url::Url;

use crate::error::{RegistryError, Result};

const REMOTE_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

/// Returns `true` if `location` names a repository reachable over the network.
pub fn is_remote(location: &str) -> bool {
    location.split_once("://").is_some_and(|(scheme, _)| {
        REMOTE_SCHEMES
            .iter()
            .any(|remote| scheme.eq_ignore_ascii_case(remote))
    })
}

fn parse_remote(location: &str) -> Result<Url> {
    let url = Url::parse(location)
        .map_err(|err| RegistryError::InvalidLocation(format!("{location}: {err}")))?;

    if url.host_str().is_none() {
        return Err(RegistryError::InvalidLocation(format!(
            "{location}: missing host"
        )));
    }

    Ok(url)
}

/// Derives the cache directory name of a remote repository.
///
/// Every character that is not alphanumeric, `-` or `_` becomes `_`, so
/// `https://repo.example.org/current/x86_64` maps to
/// `repo_example_org_current_x86_64`.
fn cache_dir_name(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let mut name = match url.port() {
        Some(port) => format!("{host}_{port}"),
        None => host.to_string(),
    };

    let path = url.path().trim_matches('/');
    if !path.is_empty() {
        name.push('_');
        name.push_str(path);
    }

    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Resolves the local path of the index artifact for `location`.
///
/// # Errors
///
/// * [`RegistryError::InvalidLocation`] if a remote location is not a valid URL
/// * [`RegistryError::Path`] if a local location cannot be expanded
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use rpool_registry::location::index_path;
///
/// let path = index_path(
///     "https://repo.example.org/current/x86_64",
///     Path::new("/var/db/rpool"),
///     "index.json.zst",
/// )
/// .unwrap();
/// assert_eq!(
///     path,
///     Path::new("/var/db/rpool/repo_example_org_current_x86_64/index.json.zst")
/// );
/// ```
pub fn index_path(location: &str, metadata_dir: &Path, index_file: &str) -> Result<PathBuf> {
    if is_remote(location) {
        let url = parse_remote(location)?;
        Ok(metadata_dir.join(cache_dir_name(&url)).join(index_file))
    } else {
        Ok(resolve_path(location)?.join(index_file))
    }
}

/// URL of the index file published by a remote repository.
pub fn index_url(location: &str, index_file: &str) -> Result<Url> {
    let base = parse_remote(location)?;
    let mut url = base.clone();
    url.set_path(&format!("{}/{index_file}", base.path().trim_end_matches('/')));
    Ok(url)
}
