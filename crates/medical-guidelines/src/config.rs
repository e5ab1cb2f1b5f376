use std::path::PathBuf;
use std::time::Duration;

use mcp_common::http::HttpClientConfig;

use crate::error::AppError;

const DEFAULT_PACING_MS: u64 = 1500;

/// Application configuration loaded explicitly from environment variables.
///
/// Nothing is required; without overrides the built-in domain registry is used
/// and the server speaks MCP on stdio.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON file replacing the built-in domain registry.
    pub domains_file: Option<PathBuf>,
    /// Pause after each domain pass.
    pub domain_pacing: Duration,
    pub http: HttpClientConfig,
    /// Address for the streamable HTTP endpoint, if enabled.
    pub http_listen_addr: Option<String>,
    /// Address for raw MCP over TCP, if enabled.
    pub tcp_listen_addr: Option<String>,
}

impl Config {
    /// Optional:
    /// - `MEDICAL_GUIDELINES_DOMAINS_FILE`: path to a JSON domain registry
    /// - `DOMAIN_PACING_MS` (default: 1500)
    /// - `MCP_HTTP_LISTEN_ADDR`, or `PORT` (binds `0.0.0.0:<PORT>`)
    /// - `MCP_TCP_LISTEN_ADDR`
    /// - `HTTP_*` client settings, see `HttpClientConfig::from_env`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let domains_file = lookup("MEDICAL_GUIDELINES_DOMAINS_FILE").map(PathBuf::from);
        if let Some(path) = &domains_file {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "domain registry file not found: {}",
                    path.display()
                )));
            }
        }

        let domain_pacing = match lookup("DOMAIN_PACING_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| {
                    AppError::Config(format!("DOMAIN_PACING_MS must be an integer, got '{raw}'"))
                })?,
            None => Duration::from_millis(DEFAULT_PACING_MS),
        };

        let http_listen_addr = lookup("MCP_HTTP_LISTEN_ADDR")
            .or_else(|| lookup("PORT").map(|port| format!("0.0.0.0:{}", port.trim())));
        let tcp_listen_addr = lookup("MCP_TCP_LISTEN_ADDR");

        Ok(Self {
            domains_file,
            domain_pacing,
            http: HttpClientConfig::from_lookup(lookup),
            http_listen_addr,
            tcp_listen_addr,
        })
    }
}
