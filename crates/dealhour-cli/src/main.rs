mod commands;
mod scheduler;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use dealhour_core::{DocumentStore, FileStore};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "dealhour")]
#[command(about = "eBay deal discovery and Telegram channel publishing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build today's deal queue from a random sweep of niches
    Generate,
    /// Post the next batch from the deal queue
    Send {
        /// Evaluate the send window at this hour (0-23) instead of the local clock
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
        hour: Option<u32>,
    },
    /// List the category snapshot
    Categories {
        /// Fetch the category tree from eBay and replace the snapshot first
        #[arg(long)]
        refresh: bool,
    },
    /// Print one random mixed-niche search strategy as JSON
    Strategy,
    /// Run the generation and send schedules until interrupted
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(dealhour_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let store: Arc<dyn DocumentStore> = Arc::new(FileStore::new(&config.data_dir));

    match cli.command {
        Commands::Generate => commands::run_generate(&config, store).await,
        Commands::Send { hour } => commands::run_send(&config, store, hour).await,
        Commands::Categories { refresh } => commands::run_categories(&config, store, refresh).await,
        Commands::Strategy => commands::run_strategy(&config, store.as_ref()),
        Commands::Serve => commands::run_serve(config, store).await,
    }
}
