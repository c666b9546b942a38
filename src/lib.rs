//! Sumi-Trail: a web-graph traversal engine
//!
//! This crate explores the hyperlink graph of live pages starting from a seed URL,
//! either breadth-first (level by level, with bounded parallel fan-out) or
//! depth-first (a single randomized path with backtracking). It stops on a depth
//! or page budget, on an optional keyword, or on cancellation, and streams one
//! ordered event per visited page.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Trail operations
#[derive(Debug, Error)]
pub enum TrailError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RunStatus,
        to: state::RunStatus,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Crawl task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid search type: {0}")]
    InvalidSearchType(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Fragment-only reference: {0}")]
    FragmentOnly(String),

    #[error("Empty link reference")]
    Empty,
}

/// Errors for a single page fetch
///
/// None of these abort a run. The engine treats every variant except
/// `Cancelled` as "this page yields no links".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Fetch of {url} cancelled")]
    Cancelled { url: String },
}

impl FetchError {
    /// Returns true if the fetch was aborted by run cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Result type alias for Sumi-Trail operations
pub type Result<T> = std::result::Result<T, TrailError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlRequest, SearchType};
pub use crawler::{spawn_crawl, CrawlHandle, CrawlOutcome, Crawler, HttpFetcher, PageFetcher};
pub use output::{CrawlEvent, PageVisitedEvent};
pub use state::{PageRecord, RunStatus, StopReason};
pub use url::{normalize_link, validate_seed};
