use serde::Deserialize;
use std::time::Duration;

/// Rotating client identities used when the configuration does not name any
pub const DEFAULT_USER_AGENTS: [&str; 4] = [
    // Chrome
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/70.0.3538.77 Safari/537.36",
    // Firefox
    "Mozilla/5.0 (X11; Linux i686; rv:64.0) Gecko/20100101 Firefox/64.0",
    // Safari
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_9_3) AppleWebKit/537.75.14 (KHTML, like Gecko) Version/7.0.3 Safari/7046A194A",
    // Edge
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML like Gecko) Chrome/51.0.2704.79 Safari/537.36 Edge/14.14931",
];

/// Largest depth or step limit any configuration may allow
pub const HARD_LIMIT_CEILING: u32 = 1000;

/// Main configuration structure for Sumi-Trail
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Hard ceiling for the breadth-first depth limit
    #[serde(rename = "max-breadth-limit")]
    pub max_breadth_limit: u32,

    /// Hard ceiling for the depth-first step limit
    #[serde(rename = "max-depth-limit")]
    pub max_depth_limit: u32,

    /// Default cap on pages visited per run
    #[serde(rename = "max-total-pages")]
    pub max_total_pages: usize,

    /// Maximum concurrent fetches per breadth-first batch
    #[serde(rename = "max-in-flight")]
    pub max_in_flight: usize,

    /// Per-fetch timeout (milliseconds)
    #[serde(rename = "fetch-timeout-ms")]
    pub fetch_timeout_ms: u64,
}

impl CrawlerConfig {
    /// Per-fetch timeout as a Duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_breadth_limit: 3,
            max_depth_limit: 30,
            max_total_pages: 1000,
            max_in_flight: 8,
            fetch_timeout_ms: 10_000,
        }
    }
}

/// Client identity configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Identity strings picked uniformly at random per request
    pub pool: Vec<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            pool: DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for per-run record logs; no record log when absent
    #[serde(rename = "log-directory")]
    pub log_directory: Option<String>,
}
