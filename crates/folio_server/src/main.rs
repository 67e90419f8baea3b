//! `foliod` - the Folio publishing service daemon.
//!
//! Opens (or creates) the data directory, binds the listen address and
//! serves until interrupted. Static site files are served from the
//! `static/` subdirectory of the data directory.

use clap::Parser;
use folio_server::{register_routes, AppState, Dispatcher, LogNotifier, Router, ServerConfig};
use folio_core::{Service, SystemClock};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The Folio publishing service daemon.
#[derive(Parser)]
#[command(name = "foliod")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the service data directory
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Static file root (defaults to <data-dir>/static)
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Idle session lifetime in seconds
    #[arg(long, default_value_t = 900)]
    session_ttl: u64,

    /// Session sweep interval in seconds
    #[arg(long, default_value_t = 1)]
    sweep_interval: u64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = ServerConfig::new(cli.data_dir)
        .with_bind_addr(cli.bind)
        .with_session_ttl(Duration::from_secs(cli.session_ttl))
        .with_sweep_interval(Duration::from_secs(cli.sweep_interval));
    if let Some(static_dir) = cli.static_dir {
        config = config.with_static_dir(static_dir);
    }

    let service = Arc::new(Service::open_with_ttl(
        &config.data_dir,
        Arc::new(SystemClock),
        config.session_ttl,
    )?);

    let static_dir = config
        .static_dir
        .clone()
        .unwrap_or_else(|| service.static_dir());
    let mut router = Router::new();
    register_routes(&mut router, static_dir);

    let sweeper = folio_server::spawn_sweeper(Arc::clone(&service), config.sweep_interval);

    let state = Arc::new(AppState::new(Arc::clone(&service), Arc::new(LogNotifier)));
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, data_dir = %config.data_dir.display(), "serving");

    let result = Dispatcher::new(router, state).serve(listener).await;
    sweeper.abort();
    result.map_err(Into::into)
}
