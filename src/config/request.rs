//! Invocation parameters for a single crawl run

use crate::config::types::{CrawlerConfig, HARD_LIMIT_CEILING};
use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Traversal discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchType {
    /// Level-order walk with bounded parallel fan-out per level
    Breadth,
    /// Single randomized path with backtracking
    Depth,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breadth => "Breadth",
            Self::Depth => "Depth",
        }
    }

    /// The hard ceiling on `limit` for this discipline
    pub fn ceiling(&self, config: &CrawlerConfig) -> u32 {
        match self {
            Self::Breadth => config.max_breadth_limit,
            Self::Depth => config.max_depth_limit,
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breadth" => Ok(Self::Breadth),
            "depth" => Ok(Self::Depth),
            _ => Err(ConfigError::InvalidSearchType(s.to_string())),
        }
    }
}

/// One crawl invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    /// Absolute http(s) URL the run starts from
    pub seed_url: String,

    pub search_type: SearchType,

    /// Depth limit (breadth-first) or step limit (depth-first)
    pub limit: u32,

    /// Stop keyword; `None` disables the keyword check
    pub keyword: Option<String>,

    /// Cap on pages visited in this run
    pub max_total_pages: usize,
}

impl CrawlRequest {
    /// Builds a request using the configured page cap
    pub fn new(
        seed_url: impl Into<String>,
        search_type: SearchType,
        limit: u32,
        config: &CrawlerConfig,
    ) -> Self {
        Self {
            seed_url: seed_url.into(),
            search_type,
            limit,
            keyword: None,
            max_total_pages: config.max_total_pages,
        }
    }

    /// Sets the stop keyword. Empty or whitespace-only keywords count as absent.
    pub fn with_keyword(mut self, keyword: Option<impl Into<String>>) -> Self {
        self.keyword = keyword
            .map(Into::into)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self
    }

    pub fn with_max_total_pages(mut self, max_total_pages: usize) -> Self {
        self.max_total_pages = max_total_pages;
        self
    }
}

/// Validates a request against the configured ceilings
///
/// The seed URL itself is checked by the engine at run start, so that an
/// invalid seed produces the `InvalidSeed` terminal outcome.
pub fn validate_request(request: &CrawlRequest, config: &CrawlerConfig) -> Result<(), ConfigError> {
    // A config built in code skips `validate`, so the hard ceiling applies here too
    let ceiling = request.search_type.ceiling(config).min(HARD_LIMIT_CEILING);
    if request.limit > ceiling {
        return Err(ConfigError::Validation(format!(
            "{} limit must be <= {}, got {}",
            request.search_type, ceiling, request.limit
        )));
    }

    if request.max_total_pages < 1 {
        return Err(ConfigError::Validation(
            "max_total_pages must be >= 1".to_string(),
        ));
    }

    Ok(())
}
