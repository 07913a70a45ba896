use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Build a portfolio from the GitHub repositories that carry a portfolio.json
#[derive(Parser)]
#[command(name = "showcase")]
#[command(version, about = "Discover portfolio projects on GitHub and render them", long_about = None)]
pub struct Cli {
    /// Path to showcase.toml (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// GitHub user whose repositories are scanned
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Database URL for the cache (defaults to a SQLite file in the data dir)
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Keep the cache in memory only
    #[arg(long, global = true)]
    pub no_persist: bool,

    /// Repositories fetched at once
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load projects and print them
    Fetch {
        /// Ignore a fresh cache
        #[arg(short, long)]
        refresh: bool,
        /// Print the records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the static site
    Build {
        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Ignore a fresh cache
        #[arg(short, long)]
        refresh: bool,
    },
    /// Browse projects and galleries interactively
    Browse {
        /// Ignore a fresh cache
        #[arg(short, long)]
        refresh: bool,
    },
    /// Inspect or clear the cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Show age and size of the cached snapshot
    Status,
    /// Remove the cached snapshot
    Clear,
}
