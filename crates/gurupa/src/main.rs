use std::{io::Read, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};

use gurupa_core::{config::Config, update::handle_event};

/// Anonymous group chat relay for Telegram.
#[derive(Parser)]
#[command(name = "gurupa", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot (webhook when WEBHOOK_URL is set, long polling otherwise).
    Run,

    /// Handle a single webhook update and print the response as JSON.
    HandleEvent {
        /// Read the update from this file instead of stdin.
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gurupa_core::logging::init("gurupa")?;

    let cli = Cli::parse();
    let cfg = Arc::new(Config::load()?);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => gurupa_telegram::router::run(cfg).await,
        Commands::HandleEvent { file } => {
            let body = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("reading update from stdin")?;
                    buf
                }
            };

            let relay = gurupa_telegram::router::relay_from_config(&cfg);
            let response = handle_event(&relay, &body).await?;
            println!("{}", serde_json::to_string(&response)?);
            Ok(())
        }
    }
}
