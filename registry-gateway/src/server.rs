//! HTTP server for the registry gateway

use crate::config::GatewayConfig;
use crate::handlers::{passthrough, pull_manifest, push_manifest};
use crate::route::{MANIFEST_ROUTE, ORG_MANIFEST_ROUTE};
use crate::state::AppState;
use crate::SERVICE_NAME;
use anyhow::{Context, Result};
use axum::{
    routing::{get, MethodRouter},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the gateway router.
///
/// `GET` and `PUT` on the two manifest patterns are instrumented; every other
/// method or path falls through to the registry untouched.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(MANIFEST_ROUTE, manifest_methods())
        .route(ORG_MANIFEST_ROUTE, manifest_methods())
        .fallback(passthrough)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn manifest_methods() -> MethodRouter<AppState> {
    // axum would otherwise serve HEAD with the GET handler.
    get(pull_manifest)
        .head(passthrough)
        .put(push_manifest)
        .fallback(passthrough)
}

/// Run the gateway with optional graceful shutdown
pub async fn run_server_with_shutdown(
    config: GatewayConfig,
    shutdown_receiver: Option<tokio::sync::oneshot::Receiver<()>>,
) -> Result<()> {
    let addr = config.bind_address();
    info!(
        service = SERVICE_NAME,
        upstream = %config.upstream_url,
        hub = %config.hub_url,
        "Starting registry gateway on {}",
        addr
    );

    let state = AppState::new(&config).context("Failed to initialize gateway state")?;
    let app = build_router(state).into_make_service_with_connect_info::<SocketAddr>();

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("Registry gateway listening on {}", addr);

    match shutdown_receiver {
        Some(shutdown_rx) => {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                    info!("Received shutdown signal, stopping registry gateway gracefully");
                })
                .await
                .context("Server failed to start")?;
        }
        None => {
            axum::serve(listener, app)
                .await
                .context("Server failed to start")?;
        }
    }

    Ok(())
}

/// Run the gateway in the foreground until the process exits
pub async fn run_server(config: GatewayConfig) -> Result<()> {
    run_server_with_shutdown(config, None).await
}
