// src/utils/http.rs

//! HTTP fetch layer with bounded retry.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};

use crate::error::{AppError, Result};
use crate::models::{DelayRange, FetchConfig};
use crate::utils::delay;

/// Something that turns a URL into a body.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Raw body of `url`, after whatever retrying the fetcher does.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// Body decoded as UTF-8, invalid sequences replaced.
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let bytes = self.fetch(url).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Politeness wait between two requests to the same source.
    async fn pause(&self) {}
}

/// Why a single attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Non-success HTTP status
    Status(u16),
    /// Timeout, refused connection, broken body
    Network(String),
}

/// Bounded retry: attempt cap, linear backoff on retryable statuses and a
/// random wait after network errors.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub network_jitter: DelayRange,
    pub retry_statuses: Vec<u16>,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            network_jitter: config.retry_jitter_ms,
            retry_statuses: config.retry_statuses.clone(),
        }
    }

    pub fn is_retryable(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Wait before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base * attempt
    }

    /// Run `op` until it succeeds, fails permanently or attempts run out.
    pub async fn run<T, F, Fut>(&self, url: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, Failure>>,
    {
        let max = self.max_attempts.max(1);
        let mut last = Failure::Network("no attempt made".into());

        for attempt in 1..=max {
            match op().await {
                Ok(value) => return Ok(value),
                Err(Failure::Status(code)) if self.is_retryable(code) => {
                    log::debug!("HTTP {code} from {url} (attempt {attempt}/{max})");
                    last = Failure::Status(code);
                    if attempt < max {
                        tokio::time::sleep(self.backoff(attempt)).await;
                    }
                }
                Err(Failure::Status(code)) => {
                    return Err(AppError::fetch(url, format!("HTTP {code}")));
                }
                Err(Failure::Network(message)) => {
                    log::debug!("Request error {url} (attempt {attempt}/{max}): {message}");
                    last = Failure::Network(message);
                    if attempt < max {
                        delay::random_pause(self.network_jitter, "retry after network error")
                            .await;
                    }
                }
            }
        }

        let message = match last {
            Failure::Status(code) => format!("HTTP {code} after {max} attempts"),
            Failure::Network(message) => format!("{message} (after {max} attempts)"),
        };
        Err(AppError::fetch(url, message))
    }
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &FetchConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.8,*/*;q=0.7",
        ),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7"),
    );

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .build()?;
    Ok(client)
}

/// Live fetcher: rotating user agent, retry policy, politeness pause.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agents: Vec<String>,
    policy: RetryPolicy,
    request_delay: DelayRange,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            user_agents: config
                .user_agents
                .iter()
                .filter(|ua| !ua.trim().is_empty())
                .cloned()
                .collect(),
            policy: RetryPolicy::from_config(config),
            request_delay: config.request_delay_ms,
        })
    }

    fn user_agent(&self) -> String {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| format!("company-aggregator/{}", env!("CARGO_PKG_VERSION")))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.policy
            .run(url, move || async move {
                let user_agent = self.user_agent();
                let response = self
                    .client
                    .get(url)
                    .header(USER_AGENT, user_agent)
                    .send()
                    .await
                    .map_err(|e| Failure::Network(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(Failure::Status(status.as_u16()));
                }
                response
                    .bytes()
                    .await
                    .map(|b| b.to_vec())
                    .map_err(|e| Failure::Network(e.to_string()))
            })
            .await
    }

    async fn pause(&self) {
        delay::random_pause(self.request_delay, "politeness").await;
    }
}
