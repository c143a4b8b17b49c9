use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{
    error::{RegistryError, Result},
    index::{IndexPackage, RepositoryIndex},
    provider::IndexProvider,
};

/// Scripted behavior of one location.
#[derive(Clone)]
pub enum Script {
    ResolveFails,
    FetchFails,
    NotFound,
    Corrupt,
    Index(RepositoryIndex),
}

/// In-memory [`IndexProvider`]. Unscripted locations load an empty index.
///
/// Artifacts live at `<location>/index.json`, so locations should be path-like.
#[derive(Default)]
pub struct MockProvider {
    scripts: RefCell<HashMap<String, Script>>,
    resolves: Cell<usize>,
    loads: Cell<usize>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, location: &str, script: Script) -> Self {
        self.rescript(location, script);
        self
    }

    pub fn rescript(&self, location: &str, script: Script) {
        self.scripts
            .borrow_mut()
            .insert(location.to_string(), script);
    }

    pub fn resolves(&self) -> usize {
        self.resolves.get()
    }

    pub fn loads(&self) -> usize {
        self.loads.get()
    }

    fn lookup(&self, location: &str) -> Option<Script> {
        self.scripts.borrow().get(location).cloned()
    }
}

impl IndexProvider for MockProvider {
    fn index_path(&self, location: &str) -> Result<PathBuf> {
        self.resolves.set(self.resolves.get() + 1);
        match self.lookup(location) {
            Some(Script::ResolveFails) => Err(RegistryError::InvalidLocation(location.into())),
            _ => Ok(Path::new(location).join("index.json")),
        }
    }

    fn ensure_index(&self, _path: &Path, location: &str) -> Result<()> {
        match self.lookup(location) {
            Some(Script::FetchFails) => Err(RegistryError::FailedToFetchRemote(location.into())),
            _ => Ok(()),
        }
    }

    fn load_index(&self, path: &Path) -> Result<RepositoryIndex> {
        self.loads.set(self.loads.get() + 1);
        let location = path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self.lookup(&location) {
            Some(Script::NotFound) => Err(RegistryError::IndexNotFound {
                path: path.to_path_buf(),
            }),
            Some(Script::Corrupt) => Err(RegistryError::Custom(format!(
                "corrupt index {}",
                path.display()
            ))),
            Some(Script::Index(index)) => Ok(index),
            _ => Ok(RepositoryIndex::default()),
        }
    }
}

pub fn package(pkgname: &str) -> IndexPackage {
    IndexPackage {
        pkgname: pkgname.to_string(),
        version: "1.0_1".to_string(),
        architecture: None,
        short_desc: None,
        filename: None,
        filename_sha256: None,
        installed_size: None,
        run_depends: Vec::new(),
        provides: Vec::new(),
    }
}

pub fn index_with(pkgnames: &[&str]) -> RepositoryIndex {
    RepositoryIndex {
        version: None,
        packages: pkgnames.iter().map(|name| package(name)).collect(),
    }
}
