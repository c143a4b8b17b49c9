use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the effective configuration
    Config,

    /// Generate a default configuration file
    #[clap(name = "defconfig")]
    DefConfig,

    /// List registered repositories in priority order
    #[clap(name = "list", visible_alias = "ls")]
    List,

    /// Show the package that would be picked for a name
    #[command(arg_required_else_help = true)]
    #[clap(name = "show", visible_alias = "query")]
    Show {
        /// Package name
        #[arg(required = true)]
        package: String,

        /// Treat the name as a virtual package and look up its provider
        #[arg(required = false, short, long)]
        provides: bool,
    },

    /// Search packages by name or description
    #[command(arg_required_else_help = true)]
    #[clap(name = "search", visible_alias = "s", visible_alias = "find")]
    Search {
        /// Case-insensitive search pattern
        #[arg(required = true)]
        query: String,

        /// Limit the number of results
        #[arg(required = false, long)]
        limit: Option<usize>,
    },

    /// Fetch fresh indexes of remote repositories
    #[clap(name = "sync", visible_alias = "fetch")]
    Sync,
}

impl Commands {
    /// Whether the command needs the configuration file loaded first.
    pub fn loads_config(&self) -> bool {
        !matches!(self, Commands::DefConfig)
    }
}
