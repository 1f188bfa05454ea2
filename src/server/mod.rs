//! HTTP tool server: authenticated JSON-RPC on `/mcp`, plus a health probe

pub mod auth;
pub mod rpc;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::tools::ToolRegistry;

/// Shared state for every request.
pub struct AppState {
    pub tools: ToolRegistry,
    pub auth_token: String,
}

/// Build the router. Only `/mcp` sits behind the bearer check.
pub fn router(state: Arc<AppState>) -> Router {
    let mcp = Router::new()
        .route("/mcp", post(rpc::handle))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ))
        .with_state(state);

    Router::new().route("/health", get(health)).merge(mcp)
}

async fn health() -> &'static str {
    "ok"
}

/// Bind and serve until Ctrl-C.
///
/// # Errors
///
/// Returns error if no auth token is configured or the address cannot be bound
pub async fn serve(config: &ServerConfig, tools: ToolRegistry) -> Result<()> {
    if !config.is_configured() {
        bail!("no auth token configured: set AUTH_TOKEN or [server] auth_token");
    }

    let state = Arc::new(AppState {
        tools,
        auth_token: config.auth_token.clone(),
    });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "tool server listening on http://{addr}/mcp");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .context("server error")?;
    Ok(())
}
