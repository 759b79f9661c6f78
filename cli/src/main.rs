//! Tunnelkeeper CLI - Keep a gateway control tunnel alive
//!
//! A command-line tool for ensuring a single SSH tunnel to the remote
//! gateway control port, checking its status, and inspecting configuration.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tunnelkeeper")]
#[command(author, version, about = "Keep a gateway control tunnel alive")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ensure the control tunnel exists and hold it open until Ctrl-C
    Run,

    /// Show whether a usable tunnel is available, without creating one
    #[command(alias = "st")]
    Status,

    /// Show current configuration
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => commands::run::run().await?,
        Commands::Status => commands::status::run(cli.json).await?,
        Commands::Config => commands::config::run(cli.json).await?,
    }

    Ok(())
}
