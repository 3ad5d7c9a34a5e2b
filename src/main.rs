use std::sync::{Arc, Mutex};

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use liftoff::app::AppContext;
use liftoff::cli::{commands, Cli, Commands};
use liftoff::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so its logs go to a file.
    if matches!(cli.command, Commands::Tui) {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(AppContext::default_log_path()?)?;
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(Mutex::new(log_file)).with_ansi(false))
            .with(EnvFilter::from_default_env())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(EnvFilter::from_default_env())
            .init();
    }

    let config = match cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = AppContext::new(config, cli.db)?;

    match cli.command {
        Commands::List { offset, search, all } => {
            commands::list_articles(&ctx, offset, search, all).await?;
        }
        Commands::Show { id, open } => {
            commands::show_article(&ctx, id, open).await?;
        }
        Commands::Sites { filter } => {
            commands::list_sites(&ctx, filter.as_deref()).await?;
        }
        Commands::Prefer { site, clear } => {
            commands::prefer_site(&ctx, site.as_deref(), clear)?;
        }
        Commands::Tui => {
            liftoff::tui::run(Arc::new(ctx)).await?;
        }
    }

    Ok(())
}
