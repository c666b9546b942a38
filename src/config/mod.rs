//! Configuration module for Sumi-Trail
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! plus the per-run invocation parameters.
//!
//! # Example
//!
//! ```no_run
//! use sumi_trail::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trail.toml")).unwrap();
//! println!("Depth-first ceiling: {}", config.crawler.max_depth_limit);
//! ```

mod parser;
mod request;
mod types;
mod validation;

// Re-export types
pub use request::{validate_request, CrawlRequest, SearchType};
pub use types::{
    Config, CrawlerConfig, OutputConfig, UserAgentConfig, DEFAULT_USER_AGENTS, HARD_LIMIT_CEILING,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
