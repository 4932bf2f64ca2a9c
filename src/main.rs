//! github-user-search: find GitHub users by login, ranked by followers
//!
//! This is the main entry point for the application.

use anyhow::Result;
use clap::{Parser, Subcommand};
use github_user_search::{
    config::{self, Settings},
    metrics::Metrics,
    web::{create_router, AppState},
    ResultSet, SearchSession,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "github-user-search", version, about = "Search GitHub users by login, ranked by followers")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the web interface
    Serve,
    /// Run one search and print the ranked users
    Search {
        /// Login fragment to search for
        term: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Fail if the search needs more pages than this
        #[arg(long)]
        max_pages: Option<u32>,
    },
    /// Read search terms from stdin; each line replaces the previous search
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = config::load(cli.config.as_deref())?;
    init_logging(&settings);

    info!("Starting github-user-search v{}", github_user_search::VERSION);
    if settings.github.token.is_none() {
        info!("No GITHUB_ACCESS_TOKEN set; requests will be sent unauthenticated");
    }

    match cli.command {
        Command::Serve => serve(settings).await,
        Command::Search {
            term,
            json,
            max_pages,
        } => search(settings, &term, json, max_pages).await,
        Command::Watch => watch(settings).await,
    }
}

fn init_logging(settings: &Settings) {
    let default_level = if settings.general.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn serve(settings: Settings) -> Result<()> {
    let metrics = Arc::new(Metrics::new());
    let aggregator = github_user_search::build_aggregator(&settings, metrics.clone())?;

    let addr = SocketAddr::new(settings.server.bind_address.parse()?, settings.server.port);

    let state = AppState::new(&settings, aggregator, metrics)?;
    let app = create_router(state);

    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn search(mut settings: Settings, term: &str, json: bool, max_pages: Option<u32>) -> Result<()> {
    if max_pages.is_some() {
        settings.search.max_pages = max_pages;
    }

    let aggregator = github_user_search::build_aggregator(&settings, Arc::new(Metrics::new()))?;
    let set = aggregator
        .aggregate(term)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&set)?);
    } else {
        println!("{}", set.to_table());
    }
    Ok(())
}

async fn watch(settings: Settings) -> Result<()> {
    let aggregator = github_user_search::build_aggregator(&settings, Arc::new(Metrics::new()))?;
    let session = SearchSession::new(Arc::new(aggregator), github_user_search::debounce(&settings));

    let mut updates = session.subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let view = updates.borrow_and_update().clone();
            if view.loading {
                eprintln!("Loading...");
                continue;
            }
            let set = ResultSet {
                records: view.records,
                pages_fetched: 0,
            };
            println!("{}", set.to_table());
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last = None;
    while let Some(line) = lines.next_line().await? {
        last = Some(session.submit(line));
    }

    if let Some(ticket) = last {
        ticket.finished().await;
    }
    drop(session);
    printer.await?;

    Ok(())
}
