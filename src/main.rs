mod cli;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use usage_forwarder::core::models::usage::EventStatus;

#[derive(Parser)]
#[command(name = "ufwd", about = "Forward LLM usage events to an ingestion endpoint", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Shorthand for --format json
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

#[derive(Args)]
struct EventArgs {
    /// Event status (success|failure)
    #[arg(short, long, default_value = "success", value_parser = parse_status)]
    status: EventStatus,

    /// Event data JSON file (`-` or omitted reads stdin)
    #[arg(short, long)]
    event: Option<PathBuf>,

    /// Provider response JSON file
    #[arg(short, long)]
    response: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the payload an event would produce
    Preview(EventArgs),
    /// Send an event to the configured endpoint
    Send(EventArgs),
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate a config file template
    Init,
    /// Validate config file and environment
    Check,
    /// Print the effective config
    Show,
}

fn parse_status(value: &str) -> Result<EventStatus, String> {
    EventStatus::from_id(value)
        .ok_or_else(|| format!("unknown status '{}' (expected success|failure)", value))
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,usage_forwarder={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output_opts = cli::output::OutputOptions {
        format: if cli.json {
            cli::output::OutputFormat::Json
        } else {
            match cli.format.as_deref() {
                Some("json") => cli::output::OutputFormat::Json,
                _ => cli::output::OutputFormat::Text,
            }
        },
        pretty: cli.pretty,
        use_color: cli::output::detect_color(!cli.no_color),
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Preview(args) => cli::preview_cmd::run(
            args.status,
            args.event.as_ref(),
            args.response.as_ref(),
            &output_opts,
        )?,
        Commands::Send(args) => {
            cli::send_cmd::run(
                args.status,
                args.event.as_ref(),
                args.response.as_ref(),
                &output_opts,
            )
            .await?
        }
        Commands::Config { action } => match action {
            ConfigAction::Init => cli::config_cmd::init(&output_opts)?,
            ConfigAction::Check => cli::config_cmd::check(&output_opts)?,
            ConfigAction::Show => cli::config_cmd::show(&output_opts)?,
        },
    }

    Ok(())
}
