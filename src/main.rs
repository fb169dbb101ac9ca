//! Live fleet tracking service.
//!
//! Field devices POST position reports; authenticated consumers read
//! positions, search the fleet, and poll per-vehicle liveness. A background
//! sweeper reclassifies silent vehicles as Offline.

use std::env;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use fleet_track::http::{self, AppState};
use fleet_track::provider::BearerGate;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracking::clock::{SharedClock, SystemClock};
use tracking::config::Config;
use tracking::fleet::FleetDirectory;
use tracking::ingest::IngestGateway;
use tracking::query::QueryService;
use tracking::store::PositionStore;
use tracking::sweeper::Sweeper;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).init();
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|value| matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env();
    let fleet = match config.fleet_file.as_deref() {
        Some(path) => FleetDirectory::from_file(path).context("loading fleet directory")?,
        None => FleetDirectory::empty(),
    };
    info!(vehicles = fleet.len(), "fleet directory loaded");

    let clock: SharedClock = Arc::new(SystemClock);
    let store = Arc::new(PositionStore::new(Arc::clone(&clock), config.offline_threshold));
    let gateway = IngestGateway::new(Arc::clone(&store), fleet);
    let queries =
        QueryService::new(Arc::clone(&store), Arc::clone(&clock), config.liveness_threshold);
    let gate = Arc::new(BearerGate::from_env());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = Sweeper::new(Arc::clone(&store), clock, config.sweep_interval, shutdown_rx);
    let sweep_task = tokio::spawn(sweeper.run());

    let state = AppState::new(gateway, queries, store, gate);
    let app = http::router(state);

    let bind = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&bind).await.with_context(|| format!("binding {bind}"))?;
    info!(%bind, "fleet tracking service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("serving http")?;

    shutdown_tx.send(true).context("stopping sweeper")?;
    sweep_task.await.context("joining sweeper")?;
    Ok(())
}
