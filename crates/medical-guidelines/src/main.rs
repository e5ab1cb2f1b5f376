mod config;
mod error;
mod extract;
mod format;
mod lexicon;
mod model;
mod normalize;
mod pacing;
mod registry;
mod results;
mod search;
mod server;
mod transport;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use lexicon::Lexicon;
use normalize::QueryNormalizer;
use registry::DomainRegistry;
use server::MedicalGuidelinesServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing to stderr (stdout is reserved for MCP JSON-RPC)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting medical-guidelines MCP server");

    let config = Config::from_env()?;
    info!(
        domains_file = ?config.domains_file,
        pacing_ms = config.domain_pacing.as_millis() as u64,
        timeout_secs = config.http.timeout.as_secs(),
        max_in_flight = config.http.max_in_flight,
        "configuration loaded"
    );

    let registry = match &config.domains_file {
        Some(path) => DomainRegistry::from_file(path)?,
        None => DomainRegistry::builtin(),
    };
    info!(domains = ?registry.ids(), "domain registry loaded");

    let lexicon = Arc::new(Lexicon::builtin());
    info!(conditions = lexicon.conditions().len(), "condition lexicon loaded");

    let server = MedicalGuidelinesServer::new(
        Arc::new(QueryNormalizer::new(lexicon)),
        Arc::new(registry),
        &config,
    );

    if let Some(addr) = config.http_listen_addr.as_deref() {
        transport::serve(server, addr).await?;
    } else if let Some(addr) = config.tcp_listen_addr.as_deref() {
        let listener = TcpListener::bind(addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.clone();
            tokio::spawn(async move {
                info!(peer = %peer, "MCP client connected");
                let service = server.serve(stream).await.inspect_err(|e| {
                    tracing::error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        info!("MCP server shut down");
    }
    Ok(())
}
