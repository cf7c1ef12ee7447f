use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use leadharvest::cli::{commands, Cli, Commands};
use leadharvest::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Scrape(args) => {
            commands::scrape(&config, args).await?;
        }
        Commands::Inspect { path } => {
            commands::inspect(&path)?;
        }
    }

    Ok(())
}
