// crates/bondline-cli/src/main.rs
//
// CLI entrypoint for the Bondline share protocol tools.
//
// Initializes tracing, loads the deployment configuration, and dispatches to
// the curve, quote, replay and init subcommands.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use commands::curve::CurveCmd;
use commands::quote::QuoteCmd;
use commands::replay::ReplayArgs;
use output::OutputFormat;

use bondline_protocol::ProtocolConfig;

/// Bondline CLI: bonding-curve share markets for content and creators.
#[derive(Parser, Debug)]
#[command(
    name = "bondline",
    version = "0.1.0",
    about = "Bondline share protocol CLI: curve math, quotes, and scenario replay"
)]
struct Cli {
    /// Path to the deployment TOML configuration file.
    #[arg(long, global = true, default_value = "~/.bondline/config.toml")]
    config: String,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Write a default deployment configuration to the --config path.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Raw curve math: prices and equity amounts.
    #[command(subcommand)]
    Curve(CurveCmd),

    /// Gateway price details for a buy or sell.
    #[command(subcommand)]
    Quote(QuoteCmd),

    /// Deploy from config and replay a TOML scenario of trades and governance.
    Replay(ReplayArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = commands::expand_home(&cli.config)?;

    if let Commands::Init { force } = &cli.command {
        return commands::init::run(&config_path, *force).await;
    }

    let config = match ProtocolConfig::load(&config_path) {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", config_path);
            cfg
        }
        Err(e) => {
            tracing::warn!("Could not load config from {}: {}. Using defaults.", config_path, e);
            ProtocolConfig::default()
        }
    };

    match &cli.command {
        Commands::Init { .. } => {}
        Commands::Curve(cmd) => commands::curve::run(cmd, &config, cli.output).await?,
        Commands::Quote(cmd) => commands::quote::run(cmd, &config, cli.output).await?,
        Commands::Replay(args) => commands::replay::run(args, &config, cli.output).await?,
    }

    Ok(())
}
