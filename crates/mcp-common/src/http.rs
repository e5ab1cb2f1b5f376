/// Request-scoped HTTP page fetcher.
///
/// A fetcher owns a pooled `reqwest::Client` plus a semaphore bounding the
/// number of requests in flight. Servers build one per tool call and drop it
/// when the call ends, which releases the pool on every exit path, including
/// cancellation.
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::CommonError;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
    /// Upper bound on concurrent requests issued through one fetcher.
    pub max_in_flight: usize,
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_in_flight: 5,
            pool_max_idle_per_host: 5,
        }
    }
}

impl HttpClientConfig {
    /// Optional:
    /// - `HTTP_TIMEOUT_SECS` (default: 30)
    /// - `HTTP_USER_AGENT`
    /// - `HTTP_MAX_IN_FLIGHT` (default: 5)
    /// - `HTTP_POOL_MAX_IDLE_PER_HOST` (default: 5)
    ///
    /// Unparsable values fall back to the default with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let timeout = env_number::<u64>(&lookup, "HTTP_TIMEOUT_SECS")
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let user_agent = lookup("HTTP_USER_AGENT")
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or(defaults.user_agent);

        let max_in_flight = env_number::<usize>(&lookup, "HTTP_MAX_IN_FLIGHT")
            .filter(|&n| n > 0)
            .unwrap_or(defaults.max_in_flight);

        let pool_max_idle_per_host = env_number::<usize>(&lookup, "HTTP_POOL_MAX_IDLE_PER_HOST")
            .unwrap_or(defaults.pool_max_idle_per_host);

        Self {
            timeout,
            user_agent,
            max_in_flight,
            pool_max_idle_per_host,
        }
    }
}

fn env_number<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    raw.trim()
        .parse::<T>()
        .inspect_err(|_| warn!(key, value = %raw, "ignoring unparsable environment value"))
        .ok()
}

/// Anything that can turn a URL into page markup.
///
/// Non-success statuses are errors; callers decide whether that is fatal.
pub trait PageFetcher {
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String, CommonError>> + Send;
}

#[derive(Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
    permits: Arc<Semaphore>,
}

impl HttpFetcher {
    pub fn new(config: &HttpClientConfig) -> Result<Self, CommonError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| CommonError::Client(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            permits: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
        })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, CommonError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| CommonError::LimiterClosed)?;

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CommonError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = resp.text().await?;
        debug!(url, bytes = body.len(), "page fetched");
        Ok(body)
    }
}
