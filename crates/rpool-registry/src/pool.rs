//! The repository pool: lazy build, release and guarded traversal.
//!
//! [`RepositoryPool::build`] turns the configured locations into a
//! [`Registry`]. Per location, the outcome is either an entry, a recorded
//! miss (wrong architecture, unfetchable, no index on disk) or a fatal error
//! that rolls the whole build back. [`RepositoryPool::for_each`] is the
//! consumer entry point: it builds on demand and walks the registry in
//! priority order.

use std::{fmt, path::PathBuf};

use rpool_config::config::Config;
use rpool_utils::system::machine;
use tracing::debug;

use crate::{
    arch::matches_arch,
    error::{RegistryError, Result},
    index::RepositoryIndex,
    provider::{IndexProvider, StandardIndexProvider},
    registry::{Registry, RepositoryEntry},
};

/// Counters of the last successful build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Locations considered, duplicates excluded.
    pub total: usize,
    /// Considered locations that did not yield an entry.
    pub missing: usize,
}

impl BuildStats {
    pub fn usable(&self) -> usize {
        self.total.saturating_sub(self.missing)
    }
}

/// Why a considered location produced no entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    ArchMismatch,
    FetchFailed,
    IndexNotFound,
}

impl fmt::Display for MissingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            MissingReason::ArchMismatch => "architecture not matched",
            MissingReason::FetchFailed => "index could not be fetched",
            MissingReason::IndexNotFound => "index file not found",
        };
        f.write_str(reason)
    }
}

/// Non-fatal result of processing one location.
#[derive(Debug)]
pub enum LocationOutcome {
    Registered(RepositoryEntry),
    Missing(MissingReason),
}

/// A location whose artifact is on disk but not loaded yet.
///
/// Dropping it discards everything built for the location so far.
struct PendingEntry {
    location: String,
    path: PathBuf,
}

impl PendingEntry {
    fn load<P: IndexProvider>(self, provider: &P) -> Result<LocationOutcome> {
        match provider.load_index(&self.path) {
            Ok(index) => Ok(LocationOutcome::Registered(RepositoryEntry::new(
                self.location,
                index,
            ))),
            Err(err) if err.is_not_found() => {
                debug!(
                    "[rpool] missing index file '{}' for repository '{}'",
                    self.path.display(),
                    self.location
                );
                Ok(LocationOutcome::Missing(MissingReason::IndexNotFound))
            }
            Err(err) => {
                debug!("[rpool] cannot load index {}: {}", self.path.display(), err);
                Err(err)
            }
        }
    }
}

/// The current entry of a [`RepositoryPool::for_each`] traversal.
pub struct Visit<'a> {
    entry: &'a RepositoryEntry,
    stop: bool,
    unregister: bool,
}

impl<'a> Visit<'a> {
    fn new(entry: &'a RepositoryEntry) -> Self {
        Self {
            entry,
            stop: false,
            unregister: false,
        }
    }

    pub fn entry(&self) -> &'a RepositoryEntry {
        self.entry
    }

    pub fn location(&self) -> &'a str {
        self.entry.location()
    }

    pub fn index(&self) -> &'a RepositoryIndex {
        self.entry.index()
    }

    /// Ends the traversal after this entry.
    pub fn stop(&mut self) {
        self.stop = true;
    }

    /// Removes this entry from the pool once the callback returns.
    ///
    /// The traversal continues with the entry that followed it.
    pub fn unregister(&mut self) {
        self.unregister = true;
    }
}

/// Ordered set of loaded repository indexes with an explicit lifecycle.
///
/// Single-threaded: share it across threads behind a `Mutex` guarding all
/// of `build`, `release` and `for_each`.
pub struct RepositoryPool<P> {
    locations: Vec<String>,
    provider: P,
    machine: String,
    registry: Registry,
    initialized: bool,
    stats: Option<BuildStats>,
}

impl RepositoryPool<StandardIndexProvider> {
    /// Creates a pool over the repositories of `config`, taking the list out of it.
    pub fn from_config(config: &mut Config) -> Result<Self> {
        let provider = StandardIndexProvider::from_config(config)?;
        Ok(Self::new(config.take_repositories(), provider))
    }
}

impl<P: IndexProvider> RepositoryPool<P> {
    pub fn new(locations: Vec<String>, provider: P) -> Self {
        Self {
            locations,
            provider,
            machine: machine(),
            registry: Registry::default(),
            initialized: false,
            stats: None,
        }
    }

    /// Overrides the host machine name used for architecture filtering.
    pub fn with_machine(mut self, machine: impl Into<String>) -> Self {
        self.machine = machine.into();
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Configured locations, in priority order and including duplicates.
    pub fn configured(&self) -> &[String] {
        &self.locations
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Registered entries in priority order.
    pub fn entries(&self) -> impl Iterator<Item = &RepositoryEntry> {
        self.registry.iter()
    }

    /// Locations of the registered entries in priority order.
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.registry.iter().map(RepositoryEntry::location)
    }

    pub fn stats(&self) -> Option<BuildStats> {
        self.stats
    }

    /// Loads every configured repository that applies to this host.
    ///
    /// Does nothing if the pool is already built. On failure the pool is
    /// left empty and uninitialized.
    ///
    /// # Errors
    ///
    /// * [`RegistryError::Unsupported`] if no location is configured or none
    ///   of them yielded an index
    /// * any error of [`IndexProvider::index_path`], or of
    ///   [`IndexProvider::load_index`] other than "not found"
    pub fn build(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        match self.try_build() {
            Ok(stats) => {
                self.initialized = true;
                self.stats = Some(stats);
                debug!("[rpool] initialized ok.");
                Ok(())
            }
            Err(err) => {
                self.clear_registry();
                Err(err)
            }
        }
    }

    fn try_build(&mut self) -> Result<BuildStats> {
        if self.locations.is_empty() {
            return Err(RegistryError::Unsupported);
        }

        let mut stats = BuildStats::default();

        for location in &self.locations {
            if self.registry.contains(location) {
                continue;
            }
            stats.total += 1;

            match self.process_location(location)? {
                LocationOutcome::Registered(entry) => {
                    debug!("[rpool] registered repository '{}'", entry.location());
                    self.registry.push(entry);
                }
                LocationOutcome::Missing(reason) => {
                    debug!("[rpool] skipping '{}': {}", location, reason);
                    stats.missing += 1;
                }
            }
        }

        if stats.usable() == 0 {
            return Err(RegistryError::Unsupported);
        }

        Ok(stats)
    }

    fn process_location(&self, location: &str) -> Result<LocationOutcome> {
        if !matches_arch(location, &self.machine) {
            debug!("[rpool] `{}' arch not matched, ignoring.", location);
            return Ok(LocationOutcome::Missing(MissingReason::ArchMismatch));
        }

        let path = self.provider.index_path(location)?;

        if let Err(err) = self.provider.ensure_index(&path, location) {
            debug!("[rpool] failed to fetch index for '{}': {}", location, err);
            return Ok(LocationOutcome::Missing(MissingReason::FetchFailed));
        }

        PendingEntry {
            location: location.to_string(),
            path,
        }
        .load(&self.provider)
    }

    /// Drops every registered entry and marks the pool unbuilt.
    ///
    /// A no-op on a pool that is not built.
    pub fn release(&mut self) {
        if !self.initialized {
            return;
        }

        self.clear_registry();
        debug!("[rpool] released ok.");
    }

    fn clear_registry(&mut self) {
        for entry in self.registry.drain() {
            debug!("[rpool] unregistered repository '{}'", entry.location());
        }
        self.initialized = false;
        self.stats = None;
    }

    /// Builds the pool if needed, then calls `f` on each entry in priority order.
    ///
    /// The traversal ends when `f` returns an error, which is returned as is,
    /// or after `f` calls [`Visit::stop`]. A failed build is returned without
    /// calling `f`.
    pub fn for_each<F, E>(&mut self, mut f: F) -> std::result::Result<(), E>
    where
        F: FnMut(&mut Visit<'_>) -> std::result::Result<(), E>,
        E: From<RegistryError>,
    {
        if let Err(err) = self.build() {
            if err.is_unsupported() {
                debug!("[rpool] empty repository list.");
            } else {
                debug!("[rpool] couldn't initialize: {}", err);
            }
            return Err(err.into());
        }

        let mut status = Ok(());
        let mut slot = 0;

        while slot < self.registry.slot_count() {
            let next = slot + 1;

            let Some(entry) = self.registry.slot(slot) else {
                slot = next;
                continue;
            };

            let mut visit = Visit::new(entry);
            status = f(&mut visit);
            let Visit {
                stop, unregister, ..
            } = visit;

            if unregister {
                if let Some(entry) = self.registry.take_slot(slot) {
                    debug!("[rpool] unregistered repository '{}'", entry.location());
                }
            }

            if stop || status.is_err() {
                break;
            }
            slot = next;
        }

        self.registry.compact();
        status
    }
}
