//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client
//! - Rotating the client identity per request
//! - Per-request timeouts
//! - Aborting in-flight requests when the run is cancelled
//! - Error classification
//!
//! There are no retries at this layer. A failed fetch is reported once and
//! the engine treats it as a page without links.

use crate::config::Config;
use crate::crawler::parser::PageDocument;
use crate::{FetchError, TrailError};
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use reqwest::header::USER_AGENT;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Source of page documents for the traversal engine
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Retrieves and parses `url`
    ///
    /// Must return `FetchError::Cancelled` promptly once `cancel` fires.
    async fn fetch(&self, url: &str, cancel: &CancellationToken)
        -> Result<PageDocument, FetchError>;
}

/// Builds the HTTP client shared by all fetches of a run
///
/// The client carries no default user agent; each request picks one from the
/// configured pool.
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let connect_timeout = config.crawler.fetch_timeout().min(Duration::from_secs(10));

    Client::builder()
        .connect_timeout(connect_timeout)
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `reqwest`-backed fetcher with a rotating identity pool
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    user_agents: Vec<String>,
    timeout: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher from the configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sumi_trail::config::Config;
    /// use sumi_trail::crawler::HttpFetcher;
    ///
    /// let fetcher = HttpFetcher::new(&Config::default()).unwrap();
    /// ```
    pub fn new(config: &Config) -> Result<Self, TrailError> {
        let client = build_http_client(config)?;

        Ok(Self {
            client,
            user_agents: config.user_agent.pool.clone(),
            timeout: config.crawler.fetch_timeout(),
        })
    }

    /// Picks an identity uniformly at random from the pool
    pub fn pick_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::rng())
            .map(String::as_str)
            .unwrap_or(crate::config::DEFAULT_USER_AGENTS[0])
    }

    async fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        let user_agent = self.pick_user_agent().to_string();
        tracing::debug!("GET {} as '{}'", url, user_agent);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, user_agent)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<PageDocument, FetchError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FetchError::Cancelled {
                url: url.to_string(),
            }),
            body = self.fetch_body(url) => body.map(|html| PageDocument::parse(&html)),
        }
    }
}

/// Maps a transport error onto the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
