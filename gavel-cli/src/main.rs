use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gavel_core::workflow::record::UserId;
use gavel_core::{CounterStore, PortSet, WorkflowEngine};

mod config;
mod console;
mod session;

use config::Config;
use console::{ConsoleNotification, ConsolePresentation, EnvAuthorization};
use session::Session;

/// Gavel: community moderation workflows at the console
#[derive(Parser, Debug)]
#[command(name = "gavel")]
#[command(about = "Community moderation workflows", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an interactive moderation session
    Session,
    /// Print a user's escalation counter
    Counter(CounterArgs),
}

#[derive(Parser, Debug)]
struct CounterArgs {
    /// User id to look up
    user: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let counters = CounterStore::open_in_dir(&config.state_dir);

    match cli.command {
        Commands::Session => {
            let ports = PortSet {
                presentation: Arc::new(ConsolePresentation::new()),
                notification: Arc::new(ConsoleNotification),
            };
            let engine = WorkflowEngine::new(counters, ports);
            let authorization = Arc::new(EnvAuthorization::new(config.moderator_ids.clone()));
            info!(
                "Starting session with {} moderator(s)",
                config.moderator_ids.len()
            );
            Session::new(engine, authorization).run().await
        }
        Commands::Counter(args) => {
            let user = UserId::from(args.user);
            let count = counters.get(&user).await;
            println!("{}: {}", user, count);
            Ok(())
        }
    }
}
