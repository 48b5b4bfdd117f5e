use anyhow::Result;
use todo_hub::{api, config::Config};
use todo_hub_core::storage;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "todo_hub=info,todo_hub_core=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    // parse first so RUST_LOG from .env is honoured
    let config = Config::load();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let store = storage::open(&config.database)?;
    // an unreachable store is not fatal: requests fail individually until it is back
    match store.ping().await {
        Ok(()) => info!("connected to store"),
        Err(e) => error!(error = %e, "store connection error"),
    }

    let app = api::router(store, config.static_dir.clone());

    let listener = TcpListener::bind(config.listen_addr()?).await?;
    info!("Server is running on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
