pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "liftoff")]
#[command(about = "A terminal reader for spaceflight news", long_about = None)]
pub struct Cli {
    /// Preference database (default: <data dir>/liftoff/liftoff.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file (default: ~/.config/liftoff/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List one page of articles
    List {
        /// Offset into the article list
        #[arg(short, long)]
        offset: Option<usize>,
        /// Only articles whose title contains this text
        #[arg(short, long)]
        search: Option<String>,
        /// Ignore the stored news-site preference
        #[arg(long)]
        all: bool,
    },
    /// Show a single article
    Show {
        /// Article id
        id: i64,
        /// Open the article in the browser
        #[arg(long)]
        open: bool,
    },
    /// List the news sites known to the API
    Sites {
        /// Case-insensitive filter on the site name
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Show, set or clear the preferred news site
    Prefer {
        /// News site to prefer
        site: Option<String>,
        /// Remove the stored preference
        #[arg(long, conflicts_with = "site")]
        clear: bool,
    },
    /// Launch the TUI
    Tui,
}
