use std::net::SocketAddr;
use std::sync::Arc;

use entrada_api::{app, AppState};
use entrada_store::app_config::Config;
use entrada_store::SharedTicketStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "entrada_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting Entrada API on port {}", config.server.port);

    let store = match &config.store.snapshot_path {
        Some(path) => SharedTicketStore::open(path)?,
        None => SharedTicketStore::in_memory(),
    };

    let app = app(AppState {
        store: Arc::new(store),
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
