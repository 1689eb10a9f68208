use clap::{ArgAction, Parser, Subcommand};
use commands::collect::{self, CollectArgs};
use commands::config::{self, ConfigCommands};
use commands::parse::{self, ParseArgs};
use std::path::PathBuf;

mod commands;
mod export;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "review-collector")]
#[command(about = "Collect customer reviews from a map place page")]
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

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH", env = "REVIEW_COLLECTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Write logs to a daily-rotated file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a place page in a headless browser and collect its reviews
    #[command(long_about = "Open a place page in a headless browser, scroll the reviews panel until the requested number of unique reviews is found or no new ones appear, and save them as JSON or CSV.")]
    Collect(CollectArgs),

    /// Extract reviews from a saved HTML page without a browser
    Parse(ParseArgs),

    /// View or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet, cli.log_file.clone())
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Collect(args) => collect::run_collect(args, config_path, &output).await,
        Commands::Parse(args) => parse::run_parse(args, config_path, &output),
        Commands::Config { cmd } => config::run_config(cmd.unwrap_or(ConfigCommands::Show), config_path, &output),
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Command failed");
        // JSON consumers get the failure on stdout; humans get the eyre report
        if output.format() != output::OutputFormat::Human {
            output.error(format!("{:#}", e));
            std::process::exit(1);
        }
    }
    result
}
