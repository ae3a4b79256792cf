use clap::{ArgAction, Parser, Subcommand};
use commands::{browse, config, search, title, watched};
use movie_track_config::PathManager;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "reelkeeper")]
#[command(about = "Reelkeeper - search movies, rate them, keep your watched list")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the movie database
    #[command(long_about = "Search the movie database by free text. Queries shorter than the configured minimum length return nothing without touching the network.")]
    Search {
        /// Free-text query
        query: String,
    },

    /// Show full details for one title
    Title {
        /// IMDb identifier, e.g. tt0372784
        imdb_id: String,
    },

    /// Interactive search-and-rate session
    #[command(long_about = "Run an interactive session: search, pick a title, view its details, rate it and add it to the watched list. Logs go to the log file so prompts stay readable.")]
    Browse,

    /// Show or edit the watched list
    Watched {
        #[command(subcommand)]
        cmd: Option<WatchedCommands>,
    },

    /// Configure the API key and search options
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum WatchedCommands {
    /// List watched titles with summary averages
    List,
    /// Remove one title by IMDb id
    Remove {
        imdb_id: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show,
    /// Interactively write a fresh configuration
    Init,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let paths = PathManager::default();
    // Interactive mode writes logs to a file so prompts stay readable.
    let log_file = matches!(cli.command, Commands::Browse).then(|| paths.log_file());
    logging::init_logging(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let out = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Search { query } => search::run(&out, &paths, &query).await,
        Commands::Title { imdb_id } => title::run(&out, &paths, &imdb_id).await,
        Commands::Browse => browse::run(&out, &paths).await,
        Commands::Watched { cmd } => watched::run(&out, &paths, cmd.unwrap_or(WatchedCommands::List)),
        Commands::Config { cmd } => config::run(&out, &paths, cmd.unwrap_or(ConfigCommands::Show)),
    }
}
