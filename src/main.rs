// src/main.rs

use lumen_oidc::prelude::*;
use lumen_oidc::server;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ProviderConfig::default();

    // Startup preconditions: without a signing key and a usable port the
    // process must not serve traffic.
    let key = Arc::new(SigningKey::generate()?);
    let port = config.effective_port()?;

    let discovery = DiscoveryDocument::new(&config.issuer, JWKS_PATH, AUTH_PATH);

    // Authentication capabilities (email link, federated, ...) plug in
    // here. None are wired up yet, so /authorize validates requests but
    // rejects every identity check.
    warn!("starting without authentication capabilities");
    let issuer = TokenIssuer::new(
        config.issuer_origin(),
        Arc::clone(&key),
        Vec::new(),
        config.token_ttl,
        config.auth_timeout,
    );

    let state = Arc::new(AppState {
        discovery,
        jwks: key.publishable_key_set().clone(),
        issuer,
    });

    let addr = SocketAddr::new(config.address, port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(issuer = %config.issuer_origin(), "listening on http://{addr}");

    axum::serve(listener, server::router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;

    Ok(())
}
