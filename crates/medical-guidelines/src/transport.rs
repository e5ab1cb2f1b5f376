/// Streamable HTTP transport: MCP at `/mcp` plus a `/health` probe.
use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, routing::get};
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::info;

use crate::server::MedicalGuidelinesServer;

#[derive(Clone)]
struct HealthState {
    started: Instant,
    supported_domains: Vec<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    supported_domains: Vec<String>,
    mcp_protocol: &'static str,
    version: &'static str,
}

async fn health(State(state): State<Arc<HealthState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        uptime_secs: state.started.elapsed().as_secs(),
        supported_domains: state.supported_domains.clone(),
        mcp_protocol: "streamable-http",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(server: MedicalGuidelinesServer) -> Router {
    let state = Arc::new(HealthState {
        started: Instant::now(),
        supported_domains: server
            .registry()
            .ids()
            .into_iter()
            .map(str::to_string)
            .collect(),
    });

    // Each MCP session gets its own handle; the shared tables are behind Arcs.
    let mcp = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/health", get(health))
        .with_state(state)
        .nest_service("/mcp", mcp)
}

pub async fn serve(server: MedicalGuidelinesServer, addr: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(listen_addr = %addr, "MCP server ready, serving streamable HTTP at /mcp");
    axum::serve(listener, router(server))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    info!("MCP server shut down");
    Ok(())
}
