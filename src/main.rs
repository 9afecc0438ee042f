mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "chatcal")]
#[command(about = "Manage a calendar by chatting with it")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interpret a single chat message and print the reply
    Message {
        /// The message, e.g. "Add Birthday on 2026-02-01"
        text: Vec<String>,
    },
    /// Interactive chat session (events live for the session)
    Chat,
    /// Serve JSON tool calls over stdin/stdout, one per line
    Tool,
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Message { text } => commands::message::run(&text.join(" ")),
        Commands::Chat => commands::chat::run(),
        Commands::Tool => commands::tool::run(),
    }
}

/// Logs go to stderr so the tool protocol on stdout stays clean.
fn init_logging() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set up logging: {e}"))?;
    Ok(())
}
