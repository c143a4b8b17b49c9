use std::collections::HashSet;

use nu_ansi_term::Color::{Cyan, Green, Red};
use rpool_config::config::Config;
use rpool_registry::{
    arch::matches_host_arch, location::is_remote, Result, StandardIndexProvider,
};
use tracing::{debug, error, info};

use crate::utils::Colored;

/// Downloads fresh indexes for every configured remote repository of this host.
///
/// Individual failures are reported and do not stop the remaining repositories.
pub fn sync_repositories(config: &Config) -> Result<()> {
    let provider = StandardIndexProvider::from_config(config)?;

    let mut seen = HashSet::new();
    let mut synced = 0;
    let mut failed = 0;

    for location in &config.repositories {
        if !seen.insert(location.as_str()) || !is_remote(location) {
            continue;
        }
        if !matches_host_arch(location) {
            debug!("Skipping {}: architecture not matched", location);
            continue;
        }

        match provider.refresh(location) {
            Ok(path) => {
                synced += 1;
                info!(
                    "Synced {} to {}",
                    Colored(Green, location),
                    path.display()
                );
            }
            Err(err) => {
                failed += 1;
                error!("Failed to sync {}: {}", location, err);
            }
        }
    }

    if synced == 0 && failed == 0 {
        info!("No remote repositories to sync");
    } else {
        info!(
            "{} synced, {} failed",
            Colored(Cyan, synced),
            Colored(Red, failed)
        );
    }

    Ok(())
}
