/// Error types shared across MCP server crates.
///
/// These errors represent failures talking to third-party sites over HTTP.
/// Application-specific errors should be defined in each server crate and wrap
/// `CommonError` via `#[from]`.
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("http client error: {0}")]
    Client(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("fetch limiter closed")]
    LimiterClosed,
}
