mod cli;
mod core;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::report_cmd::Window;
use crate::core::models::report::ReportMode;

#[derive(Parser)]
#[command(
    name = "claude-usage",
    about = "Token usage and cost report for Claude conversation logs",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Report width in columns (default: $COLUMNS or the terminal width)
    #[arg(long, global = true)]
    width: Option<usize>,

    /// Read logs from this directory instead of the defaults (repeatable)
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    data_dir: Vec<PathBuf>,

    /// Print the aggregation as JSON
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Totals per model over all logged usage (default)
    Summary,
    /// Usage per model for each recent hour
    Hourly {
        /// Number of hours to show (default: config or 24)
        #[arg(long)]
        hours: Option<u32>,
    },
    /// Usage per model for each recent day
    Daily {
        /// Number of days to show (default: config or 14)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate default config file
    Init,
    /// Validate config file
    Check,
    /// Print the config file location
    Path,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "claude_usage=debug"
    } else {
        "claude_usage=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output_opts = cli::output::OutputOptions {
        format: if cli.json {
            cli::output::OutputFormat::Json
        } else {
            cli::output::OutputFormat::Text
        },
        pretty: cli.pretty,
        color_flag: !cli.no_color,
        width: cli.width,
    };

    let (mode, window) = match cli.command {
        None | Some(Commands::Summary) => (ReportMode::Summary, Window::default()),
        Some(Commands::Hourly { hours }) => (
            ReportMode::Hourly,
            Window {
                hours,
                ..Window::default()
            },
        ),
        Some(Commands::Daily { days }) => (
            ReportMode::Daily,
            Window {
                days,
                ..Window::default()
            },
        ),
        Some(Commands::Config { action }) => {
            return match action {
                ConfigAction::Init => cli::config_cmd::init(),
                ConfigAction::Check => cli::config_cmd::check(),
                ConfigAction::Path => cli::config_cmd::path(),
            };
        }
    };

    cli::report_cmd::run(mode, window, &cli.data_dir, &output_opts)
}
