mod cli;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use cli::{CacheAction, Cli, Commands};
use showcase::config::Config;
use showcase::view::LOAD_ERROR_MESSAGE;
use showcase::Showcase;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("showcase=info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(user) = cli.user { config.user = user; }
    if let Some(db) = cli.database { config.database_url = Some(db); }
    if let Some(n) = cli.concurrency { config.concurrency = n.max(1); }
    if let Commands::Build { out: Some(dir), .. } = &cli.command { config.out_dir = dir.clone(); }

    let app = if cli.no_persist { Showcase::in_memory(config)? } else { Showcase::connect(config).await? };

    match cli.command {
        Commands::Fetch { refresh, json } => {
            let store = load_or_report(&app, refresh).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(store.records())?);
            } else {
                showcase::browse::write_list(&mut io::stdout(), &showcase::view::build_list_view(store.records()))?;
            }
        }
        Commands::Build { refresh, .. } => {
            let writer = app.site_writer();
            match app.load_projects(refresh).await {
                Ok(store) => {
                    let pages = writer.write_site(&store).await?;
                    println!("Wrote {} pages to {}", pages, writer.out_dir().display());
                }
                Err(e) => {
                    writer.write_error_page().await?;
                    eprintln!("{LOAD_ERROR_MESSAGE}");
                    return Err(e);
                }
            }
        }
        Commands::Browse { refresh } => {
            let store = load_or_report(&app, refresh).await?;
            let stdin = io::stdin();
            showcase::browse::run_browser(&store, stdin.lock(), &mut io::stdout())?;
        }
        Commands::Cache { action } => match action {
            CacheAction::Status => {
                let status = app.cache_status().await;
                println!("{}", serde_json::to_string_pretty(&status)?);
            }
            CacheAction::Clear => {
                let removed = app.clear_cache().await?;
                println!("Removed {} cache entr{}", removed, if removed == 1 { "y" } else { "ies" });
            }
        },
    }
    Ok(())
}

async fn load_or_report(app: &Showcase, refresh: bool) -> Result<showcase::types::ProjectStore> {
    app.load_projects(refresh).await.inspect_err(|_| eprintln!("{LOAD_ERROR_MESSAGE}"))
}
