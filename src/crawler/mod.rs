//! Crawler module for page fetching and graph traversal
//!
//! This module contains the core traversal logic, including:
//! - HTTP fetching with a rotating identity and cancellation
//! - HTML parsing, link extraction and keyword matching
//! - The depth-grouped frontier and visited set
//! - Stop-condition evaluation
//! - The breadth-first and depth-first traversal engine

mod engine;
mod evaluator;
mod fetcher;
mod frontier;
mod parser;

pub use engine::{spawn_crawl, CrawlHandle, CrawlOutcome, Crawler, EVENT_CHANNEL_CAPACITY};
pub use evaluator::{evaluate, StopCheck, StopDecision};
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher};
pub use frontier::{Frontier, FrontierEntry, VisitedSet};
pub use parser::{normalize_whitespace, KeywordMatcher, PageDocument};
