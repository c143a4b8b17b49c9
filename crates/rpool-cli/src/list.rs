use nu_ansi_term::Color::{Blue, Cyan, Green, LightRed, Magenta, Red};
use rpool_registry::{
    find_package, find_provider, search, summaries, IndexProvider, PackageMatch, RegistryError,
    RepositoryPool, Result,
};
use rpool_utils::bytes::format_bytes;
use tracing::{debug, info};

use crate::utils::Colored;

pub fn list_repositories<P: IndexProvider>(pool: &mut RepositoryPool<P>) -> Result<()> {
    let summaries = summaries(pool)?;

    if summaries.is_empty() {
        info!("No usable repositories available");
        return Ok(());
    }

    for (priority, summary) in summaries.iter().enumerate() {
        info!(
            location = summary.location,
            packages = summary.packages,
            "{:>3}. {} ({} packages{})",
            priority + 1,
            Colored(Green, &summary.location),
            Colored(Cyan, summary.packages),
            summary
                .version
                .as_deref()
                .map(|v| format!(", index {v}"))
                .unwrap_or_default()
        );
    }

    if let Some(stats) = pool.stats() {
        debug!(
            "{} repositories considered, {} missing",
            stats.total, stats.missing
        );
    }

    Ok(())
}

pub fn show_package<P: IndexProvider>(
    pool: &mut RepositoryPool<P>,
    name: &str,
    provides: bool,
) -> Result<()> {
    let found = if provides {
        find_provider(pool, name)?
    } else {
        find_package(pool, name)?
    };

    let Some(PackageMatch {
        repository,
        package,
    }) = found
    else {
        return Err(RegistryError::Custom(format!("Package {name} not found")));
    };

    info!("{}: {}", Colored(Red, "Name"), Colored(Blue, &package.pkgname));
    info!("{}: {}", Colored(Red, "Version"), Colored(LightRed, &package.version));
    info!("{}: {}", Colored(Red, "Repository"), Colored(Green, &repository));
    if let Some(ref arch) = package.architecture {
        info!("{}: {}", Colored(Red, "Architecture"), arch);
    }
    if let Some(ref desc) = package.short_desc {
        info!("{}: {}", Colored(Red, "Description"), desc);
    }
    if let Some(size) = package.installed_size {
        info!(
            "{}: {}",
            Colored(Red, "Installed size"),
            Colored(Magenta, format_bytes(size, 2))
        );
    }
    if let Some(ref filename) = package.filename {
        info!("{}: {}", Colored(Red, "Filename"), filename);
    }
    if let Some(ref checksum) = package.filename_sha256 {
        info!("{}: {}", Colored(Red, "SHA256"), checksum);
    }
    if !package.run_depends.is_empty() {
        info!(
            "{}: {}",
            Colored(Red, "Depends"),
            package.run_depends.join(", ")
        );
    }
    if !package.provides.is_empty() {
        info!("{}: {}", Colored(Red, "Provides"), package.provides.join(", "));
    }

    Ok(())
}

pub fn search_packages<P: IndexProvider>(
    pool: &mut RepositoryPool<P>,
    query: &str,
    limit: Option<usize>,
) -> Result<()> {
    debug!(query = query, limit = ?limit, "searching packages");

    let matches = search(pool, query)?;
    let total = matches.len();
    let shown = limit.unwrap_or(total).min(total);

    for PackageMatch {
        repository,
        package,
    } in matches.into_iter().take(shown)
    {
        info!(
            pkgname = package.pkgname,
            version = package.version,
            repository = repository,
            "{}-{} [{}] - {}",
            Colored(Blue, &package.pkgname),
            Colored(LightRed, &package.version),
            Colored(Green, &repository),
            package.short_desc.as_deref().unwrap_or_default()
        );
    }

    info!(
        "{}",
        Colored(Red, format!("Showing {shown} of {total}"))
    );

    Ok(())
}
