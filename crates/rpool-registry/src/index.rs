//! Repository index files and their in-memory form.
//!
//! An index artifact is a JSON document, optionally zstd-compressed:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "packages": [
//!     { "pkgname": "curl", "version": "8.5.0_1", "architecture": "x86_64" }
//!   ]
//! }
//! ```
//!
//! Contents are not validated beyond successful deserialization.

use std::{fs, io, path::Path};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{RegistryError, Result};

/// Magic bytes for Zstandard compressed files.
pub const ZST_MAGIC_BYTES: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

/// Internal enum for sizes that may be published as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlexiNumber {
    Number(u64),
    String(String),
}

fn empty_is_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.is_empty()))
}

fn optional_number<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<FlexiNumber>::deserialize(deserializer)? {
        Some(FlexiNumber::Number(n)) => Some(n),
        Some(FlexiNumber::String(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// A package entry of a repository index.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IndexPackage {
    pub pkgname: String,

    pub version: String,

    #[serde(default, alias = "arch", deserialize_with = "empty_is_none")]
    pub architecture: Option<String>,

    #[serde(default, deserialize_with = "empty_is_none")]
    pub short_desc: Option<String>,

    #[serde(default, deserialize_with = "empty_is_none")]
    pub filename: Option<String>,

    #[serde(default, deserialize_with = "empty_is_none")]
    pub filename_sha256: Option<String>,

    #[serde(default, deserialize_with = "optional_number")]
    pub installed_size: Option<u64>,

    #[serde(default)]
    pub run_depends: Vec<String>,

    /// Virtual package names this package satisfies.
    #[serde(default)]
    pub provides: Vec<String>,
}

/// The deserialized index of one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RepositoryIndex {
    /// Index format version as published by the repository.
    #[serde(default, deserialize_with = "empty_is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub packages: Vec<IndexPackage>,
}

impl RepositoryIndex {
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Looks up a package by exact name.
    pub fn get(&self, pkgname: &str) -> Option<&IndexPackage> {
        self.packages.iter().find(|pkg| pkg.pkgname == pkgname)
    }

    /// First package whose `provides` list names `virtual_name`.
    pub fn find_provider(&self, virtual_name: &str) -> Option<&IndexPackage> {
        self.packages
            .iter()
            .find(|pkg| pkg.provides.iter().any(|p| p == virtual_name))
    }
}

/// Decodes index content, transparently handling zstd compression.
///
/// `path` is only used for error reporting.
///
/// # Errors
///
/// * [`RegistryError::IndexTooShort`] if the content cannot even hold a signature
/// * [`RegistryError::IoError`] if zstd decompression fails
/// * [`RegistryError::Json`] if the JSON is malformed
pub fn decode_index(content: &[u8], path: &Path) -> Result<RepositoryIndex> {
    if content.len() < ZST_MAGIC_BYTES.len() {
        return Err(RegistryError::IndexTooShort {
            path: path.to_path_buf(),
        });
    }

    if content[..4] == ZST_MAGIC_BYTES {
        let decoded = zstd::decode_all(content).map_err(|err| {
            RegistryError::IoError {
                action: format!("decoding zstd from {}", path.display()),
                source: err,
            }
        })?;
        Ok(serde_json::from_slice(&decoded)?)
    } else {
        Ok(serde_json::from_slice(content)?)
    }
}

/// Reads and decodes the index artifact at `path`.
///
/// # Errors
///
/// Returns [`RegistryError::IndexNotFound`] if the file does not exist. Any
/// other failure (unreadable, corrupt) is reported as its own error.
pub fn load_index<P: AsRef<Path>>(path: P) -> Result<RepositoryIndex> {
    let path = path.as_ref();
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(RegistryError::IndexNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(err) => {
            return Err(RegistryError::IoError {
                action: format!("reading index file {}", path.display()),
                source: err,
            });
        }
    };

    decode_index(&content, path)
}
