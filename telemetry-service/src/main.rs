use anyhow::Result;
use std::{net::SocketAddr, sync::Arc};
use telemetry_service::{
    api::{self, ApiSettings, AppState},
    clock::SystemClock,
    config::AppConfig,
    metrics_server, observability,
    store::MetricStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    // Schema must exist before the listener accepts anything.
    let store = MetricStore::new(&cfg.store);
    store.initialize().await?;
    tracing::info!(path = %cfg.store.path.display(), "metric store initialized");

    let state = AppState::new(Arc::new(store), Arc::new(SystemClock), ApiSettings::from(&cfg));
    let app = api::router(state);

    let addr: SocketAddr = cfg
        .server
        .bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid server.bind_addr: {e}"))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, default_site = %cfg.api.default_site, "telemetry service listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("telemetry service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
