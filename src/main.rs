use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use browse_api::{
    api::{create_router, AppState},
    config::Config,
    db::{create_redis_client, Cache},
    services::{PlexGateway, SettingsStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("browse_api=debug,tower_http=info")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client).await;

    let gateway = PlexGateway::new(
        cache,
        config.media_server_url.clone(),
        config.media_server_token.clone(),
        config.item_cache_ttl,
    );

    let state = AppState::new(
        Arc::new(gateway),
        Arc::new(SettingsStore::default()),
        Duration::from_millis(config.on_deck_refresh_delay_ms),
        config.default_viewport_width,
    );
    let settings_listener = state.spawn_settings_listener();

    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, media_server = %config.media_server_url, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    settings_listener.abort();
    cache_writer.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
