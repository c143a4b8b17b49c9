use clap::Parser;
use cli::{Args, Commands};
use list::{list_repositories, search_packages, show_package};
use logging::setup_logging;
use rpool_config::{
    config::{self, generate_default_config, get_config, CONFIG_PATH},
    error::ConfigError,
};
use rpool_registry::{RepositoryPool, Result, StandardIndexProvider};
use rpool_utils::path::resolve_path;
use sync::sync_repositories;
use tracing::info;
use utils::COLOR;

mod cli;
mod list;
mod logging;
mod sync;
mod utils;

/// Builds an unbuilt pool over the configured repositories.
///
/// The repository list moves out of the global configuration into the pool.
fn create_pool() -> Result<RepositoryPool<StandardIndexProvider>> {
    let provider = StandardIndexProvider::from_config(&get_config())?;
    Ok(RepositoryPool::new(config::take_repositories(), provider))
}

fn handle_cli() -> Result<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        let mut color = COLOR.write().unwrap();
        *color = false;
    }

    if let Some(ref c) = args.config {
        *CONFIG_PATH.write().unwrap() = resolve_path(c)?;
    }

    if args.command.loads_config() {
        config::init()?;
    }

    match args.command {
        Commands::DefConfig => generate_default_config()?,
        Commands::Config => {
            let content = toml::to_string_pretty(&get_config()).map_err(ConfigError::from)?;
            info!("{}", content.trim_end());
        }
        Commands::List => list_repositories(&mut create_pool()?)?,
        Commands::Show {
            package,
            provides,
        } => show_package(&mut create_pool()?, &package, provides)?,
        Commands::Search {
            query,
            limit,
        } => search_packages(&mut create_pool()?, &query, limit)?,
        Commands::Sync => sync_repositories(&get_config())?,
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
