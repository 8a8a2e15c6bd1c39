//! Gatekeeper - User Account & Session Service
//! Mission: Authenticated, role-gated user management over HTTP

use anyhow::{Context, Result};
use gatekeeper_backend::{
    api::{create_router, AppState},
    auth::JwtManager,
    config::Config,
    middleware::request_logging,
    store::UserStore,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing();

    info!("🔐 Gatekeeper starting");

    let store = UserStore::new(
        &config.database_path,
        Duration::from_millis(config.db_busy_timeout_ms),
    )
    .context("Failed to open user store")?;

    store
        .seed_default_admin(&config.admin_email, &config.admin_password)
        .await
        .context("Failed to seed admin account")?;

    let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_expires_in_hours);

    let state = AppState {
        store: Arc::new(store),
        jwt: Arc::new(jwt),
    };

    let app = create_router(state)
        .layer(axum::middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received, draining connections");
}

/// Initialize tracing with env-filter overrides
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatekeeper_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
