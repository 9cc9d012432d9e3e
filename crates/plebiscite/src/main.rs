//! Plebiscite bot binary.

use clap::Parser;
use plebiscite::{BotConfig, init_observability};
use plebiscite_database::{PostgresVoteStore, establish_pool, run_migrations};
use plebiscite_discord::PlebisciteBot;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "plebiscite")]
#[command(about = "Discord bot for rename and cosmetic role votes")]
#[command(version)]
struct Args {
    /// Path to the configuration file; defaults apply when it does not exist
    #[arg(short, long, default_value = "plebiscite.toml")]
    config: PathBuf,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Discord bot token
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    discord_token: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = BotConfig::load_or_default(&args.config)?;
    init_observability(config.logging())?;
    info!(config_file = ?args.config, vote = ?config.vote(), "Configuration loaded");

    let pool = establish_pool(&args.database_url, *config.database().pool_size())?;
    run_migrations(&pool)?;
    info!("Database ready");

    let store = Arc::new(PostgresVoteStore::new(pool));
    let mut bot = PlebisciteBot::new(args.discord_token, store, config.vote().clone()).await?;

    let shard_manager = bot.shard_manager();
    let service = bot.service().clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                let aborted = service.shutdown();
                info!(aborted, "Pending vote timers aborted");
                shard_manager.shutdown_all().await;
            }
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
    });

    bot.start().await?;
    info!("Bot stopped");
    Ok(())
}
