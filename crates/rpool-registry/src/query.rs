//! Package lookups over a repository pool.
//!
//! Repositories are consulted in priority order. A pool without usable
//! repositories yields no results rather than an error.

use crate::{
    error::Result,
    index::IndexPackage,
    pool::{RepositoryPool, Visit},
    provider::IndexProvider,
};

/// A package together with the repository it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMatch {
    pub repository: String,
    pub package: IndexPackage,
}

impl PackageMatch {
    fn new(visit: &Visit<'_>, package: &IndexPackage) -> Self {
        Self {
            repository: visit.location().to_string(),
            package: package.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySummary {
    pub location: String,
    pub version: Option<String>,
    pub packages: usize,
}

fn traverse<P, F>(pool: &mut RepositoryPool<P>, f: F) -> Result<()>
where
    P: IndexProvider,
    F: FnMut(&mut Visit<'_>) -> Result<()>,
{
    match pool.for_each(f) {
        Err(err) if err.is_unsupported() => Ok(()),
        other => other,
    }
}

/// First package named `pkgname`, from the highest-priority repository that has it.
pub fn find_package<P: IndexProvider>(
    pool: &mut RepositoryPool<P>,
    pkgname: &str,
) -> Result<Option<PackageMatch>> {
    let mut found = None;
    traverse(pool, |visit| {
        if let Some(package) = visit.index().get(pkgname) {
            found = Some(PackageMatch::new(visit, package));
            visit.stop();
        }
        Ok(())
    })?;
    Ok(found)
}

/// First package that provides the virtual package `virtual_name`.
pub fn find_provider<P: IndexProvider>(
    pool: &mut RepositoryPool<P>,
    virtual_name: &str,
) -> Result<Option<PackageMatch>> {
    let mut found = None;
    traverse(pool, |visit| {
        if let Some(package) = visit.index().find_provider(virtual_name) {
            found = Some(PackageMatch::new(visit, package));
            visit.stop();
        }
        Ok(())
    })?;
    Ok(found)
}

/// All packages whose name or short description contains `pattern`, ignoring case.
pub fn search<P: IndexProvider>(
    pool: &mut RepositoryPool<P>,
    pattern: &str,
) -> Result<Vec<PackageMatch>> {
    let pattern = pattern.to_lowercase();
    let mut matches = Vec::new();

    traverse(pool, |visit| {
        for package in &visit.index().packages {
            let hit = package.pkgname.to_lowercase().contains(&pattern)
                || package
                    .short_desc
                    .as_deref()
                    .is_some_and(|desc| desc.to_lowercase().contains(&pattern));
            if hit {
                matches.push(PackageMatch::new(visit, package));
            }
        }
        Ok(())
    })?;

    Ok(matches)
}

/// One summary per registered repository, in priority order.
pub fn summaries<P: IndexProvider>(pool: &mut RepositoryPool<P>) -> Result<Vec<RepositorySummary>> {
    let mut summaries = Vec::new();
    traverse(pool, |visit| {
        summaries.push(RepositorySummary {
            location: visit.location().to_string(),
            version: visit.index().version.clone(),
            packages: visit.index().len(),
        });
        Ok(())
    })?;
    Ok(summaries)
}
