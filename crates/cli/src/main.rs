//! Tidewater CLI entry point.
//!
//! Commands:
//! - `init`     Write a default config file
//! - `gateway`  Start the HTTP API server
//! - `chat`     Send one message to the assistant
//! - `status`   Show the effective configuration
//! - `doctor`   Check config, credentials and upstream services

use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(
    name = "tidewater",
    about = "Tidewater: water futures trading and drought subsidy assistant",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write ~/.tidewater/config.toml with default settings
    Init,

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send a single message to the assistant
    Chat {
        /// The message to send
        #[arg(short, long)]
        message: String,

        /// Use the keyword assistant instead of tool calling
        #[arg(long)]
        simple: bool,

        /// Describe what the user is looking at
        #[arg(long)]
        page: Option<String>,
    },

    /// Show the effective configuration
    Status,

    /// Diagnose configuration and connectivity
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run()?,
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Chat {
            message,
            simple,
            page,
        } => commands::chat::run(&message, simple, page.as_deref()).await?,
        Commands::Status => commands::status::run()?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
