use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use flop_core::{BridgeConfig, SwapOption};

mod commands;

#[derive(Parser)]
#[command(
    name = "flop",
    about = "FLOP ↔ WFLOP bridge client",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to a flop.toml config file (default: ./flop.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show where to send tokens for a swap direction
    Info {
        /// Swap direction: flop-to-wflop (wrap) or wflop-to-flop (unwrap)
        #[arg(short, long, default_value = "flop-to-wflop")]
        mode: SwapOption,
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Request an account from the configured wallet
    Connect,
    /// Claim a swap for a confirmed deposit or burn transaction.
    ///
    /// The destination address comes from --address, or from the wallet
    /// when --connect is given (FLOP to WFLOP only).
    Swap {
        #[arg(short, long, default_value = "flop-to-wflop")]
        mode: SwapOption,
        /// Deposit or burn transaction ID
        #[arg(short, long)]
        tx: String,
        /// Address that receives the swapped tokens
        #[arg(short, long)]
        address: Option<String>,
        /// Pre-fill the address from the wallet
        #[arg(long)]
        connect: bool,
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "flop=debug" } else { "flop=info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.parse()?),
        )
        .init();

    let config = BridgeConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Info { mode, format } => commands::info::info(&config, mode, format),
        Commands::Connect => commands::connect::connect(&config).await,
        Commands::Swap {
            mode,
            tx,
            address,
            connect,
            format,
        } => {
            let args = commands::swap::SwapArgs {
                mode,
                tx,
                address,
                connect,
                format,
            };
            commands::swap::swap(&config, args).await
        }
    }
}
