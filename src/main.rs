use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pulsewire::app::AppContext;
use pulsewire::cli::{commands, Cli, Commands};
use pulsewire::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = Arc::new(AppContext::new(config).await?);

    match cli.command {
        Commands::Home { search } => {
            commands::show_home(ctx.clone(), search.as_deref()).await?;
        }
        Commands::Pulses { search, sort } => {
            commands::list_pulses(ctx.clone(), search.as_deref(), sort).await?;
        }
        Commands::Pulse { slug } => {
            commands::show_pulse(ctx.clone(), &slug).await?;
        }
        Commands::Articles {
            page,
            per_page,
            search,
        } => {
            commands::list_articles(&ctx, page, per_page, search.as_deref()).await?;
        }
        Commands::Saved => {
            commands::list_saved(ctx.clone()).await?;
        }
        Commands::Toggle { pulse_ids } => {
            commands::toggle_saved(ctx.clone(), &pulse_ids).await?;
        }
    }

    ctx.session.teardown();
    Ok(())
}
