//! Event Log Server - Binary Entry Point

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use event_log::api::{self, AppState, BasicAuth};
use event_log::{EventStore, EventStoreConfig, ServerConfig, SharedEventStore, SystemClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("event_log=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env().context("invalid configuration")?;
    info!(
        version = event_log::VERSION,
        data_file = %config.data_file.display(),
        "starting event log"
    );

    // Any load failure other than a missing file aborts startup
    let store = EventStore::open(EventStoreConfig::new(&config.data_file), Arc::new(SystemClock))
        .with_context(|| format!("failed to load {}", config.data_file.display()))?;

    let auth = BasicAuth::from_credentials(&config.credentials)?;
    let state = Arc::new(AppState::new(SharedEventStore::new(store), auth));

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;

    api::serve(listener, state).await?;
    Ok(())
}
