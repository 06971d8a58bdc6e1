// pi-eye - chat agent for a Raspberry Pi, its network link and Pi-hole
// Main entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use pi_eye::cli::{run_once, run_watch, ConversationShell, Repl};
use pi_eye::config::{load_config, Config};
use pi_eye::providers::create_generator;

#[derive(Parser)]
#[command(name = "pi-eye")]
#[command(about = "Chat with your Raspberry Pi: system status, network checks and Pi-hole control", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.pi-eye/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use canned replies instead of the Gemini API
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Option<PiEyeCommand>,
}

#[derive(Subcommand)]
enum PiEyeCommand {
    /// Interactive chat (default)
    Chat,
    /// Answer one prompt and exit
    Ask {
        /// Prompt text
        #[arg(required = true)]
        prompt: Vec<String>,
    },
    /// Print interface traffic every interval and flag anomalies
    Watch {
        /// Seconds between samples (default: monitoring.interval_seconds)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config);

    let session = tracing::info_span!("session", id = %Uuid::new_v4());

    match cli.command.unwrap_or(PiEyeCommand::Chat) {
        PiEyeCommand::Chat => {
            let shell = build_shell(&config, cli.demo)?;
            let mut repl = Repl::new(shell);
            repl.run().instrument(session).await?;
        }
        PiEyeCommand::Ask { prompt } => {
            let mut shell = build_shell(&config, cli.demo)?;
            run_once(&mut shell, &prompt.join(" "))
                .instrument(session)
                .await;
        }
        PiEyeCommand::Watch { interval } => {
            run_watch(&config.monitoring, interval)
                .instrument(session)
                .await?;
        }
    }

    Ok(())
}

/// Logs go to stderr so they never mix with chat output.
fn init_tracing(config: &Config) {
    let default_level = if config.features.debug_logging {
        "debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_shell(config: &Config, demo: bool) -> Result<ConversationShell> {
    let generator = create_generator(config, demo)
        .context("Failed to set up the reply generator (use --demo to run without an API key)")?;
    tracing::info!("Reply generator: {}", generator.name());
    ConversationShell::from_config(config, generator)
}
