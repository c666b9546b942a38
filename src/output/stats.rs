//! End-of-run statistics
//!
//! This module summarizes a finished run and prints the summary to stderr,
//! keeping stdout free for the event stream.

use crate::crawler::CrawlOutcome;
use crate::state::{RunStatus, StopReason};
use crate::url::extract_host;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Total number of pages visited
    pub pages_visited: usize,

    /// Count of pages per depth
    pub pages_by_depth: BTreeMap<u32, usize>,

    /// Pages whose body matched the keyword
    pub keyword_hits: usize,

    /// Number of distinct hosts visited
    pub unique_hosts: usize,

    pub status: RunStatus,
    pub stop_reason: StopReason,
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Builds statistics from a finished run
    pub fn from_outcome(outcome: &CrawlOutcome, elapsed: Duration) -> Self {
        let mut pages_by_depth = BTreeMap::new();
        let mut hosts = HashSet::new();

        for page in &outcome.pages {
            *pages_by_depth.entry(page.depth).or_insert(0) += 1;
            if let Some(host) = extract_host(&page.url) {
                hosts.insert(host);
            }
        }

        Self {
            pages_visited: outcome.pages.len(),
            pages_by_depth,
            keyword_hits: outcome.pages.iter().filter(|p| p.keyword_matched).count(),
            unique_hosts: hosts.len(),
            status: outcome.status,
            stop_reason: outcome.reason,
            elapsed,
        }
    }

    /// Pages per second over the whole run
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.pages_visited as f64 / secs
        } else {
            0.0
        }
    }
}

/// Prints statistics to stderr in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    eprintln!("=== Crawl Statistics ===\n");

    eprintln!("Overview:");
    eprintln!("  Status: {}", stats.status);
    eprintln!("  Stop reason: {}", stats.stop_reason);
    eprintln!("  Pages visited: {}", stats.pages_visited);
    eprintln!("  Unique hosts: {}", stats.unique_hosts);
    eprintln!("  Keyword hits: {}", stats.keyword_hits);
    eprintln!(
        "  Elapsed: {:.2?} ({:.2} pages/sec)",
        stats.elapsed,
        stats.rate()
    );
    eprintln!();

    if !stats.pages_by_depth.is_empty() {
        eprintln!("Pages by Depth:");
        for (depth, count) in &stats.pages_by_depth {
            let percentage = (*count as f64 / stats.pages_visited as f64) * 100.0;
            eprintln!("  {}: {} ({:.1}%)", depth, count, percentage);
        }
        eprintln!();
    }
}
