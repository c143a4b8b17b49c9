//! Repository pool for the rpool package manager.
//!
//! This crate turns an ordered list of repository locations into an ordered,
//! deduplicated set of loaded repository indexes and lets consumers walk it.
//!
//! # Overview
//!
//! For each configured location, in order:
//! - duplicates of an already registered location are skipped
//! - locations whose final path segment is neither `noarch` nor the host
//!   machine are recorded as missing
//! - the local index artifact is resolved and, for remote repositories,
//!   fetched if absent; an unfetchable index is recorded as missing
//! - the artifact is deserialized; a missing file is recorded as missing,
//!   any other failure aborts the build
//!
//! A build in which no location yields an index fails with
//! [`RegistryError::Unsupported`].
//!
//! # Example
//!
//! ```no_run
//! use rpool_config::config::Config;
//! use rpool_registry::{RegistryError, RepositoryPool};
//!
//! fn list() -> rpool_registry::Result<()> {
//!     let mut config = Config::new()?;
//!     let mut pool = RepositoryPool::from_config(&mut config)?;
//!
//!     pool.for_each(|visit| {
//!         println!("{}: {} packages", visit.location(), visit.index().len());
//!         Ok::<_, RegistryError>(())
//!     })
//! }
//! ```

pub mod arch;
pub mod error;
pub mod index;
pub mod location;
pub mod pool;
pub mod provider;
pub mod query;
pub mod registry;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::{ErrorContext, RegistryError, Result};
pub use index::{IndexPackage, RepositoryIndex, ZST_MAGIC_BYTES};
pub use pool::{BuildStats, LocationOutcome, MissingReason, RepositoryPool, Visit};
pub use provider::{IndexProvider, StandardIndexProvider};
pub use query::{find_package, find_provider, search, summaries, PackageMatch, RepositorySummary};
pub use registry::{Registry, RepositoryEntry};
