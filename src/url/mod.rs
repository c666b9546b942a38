//! URL handling module for Sumi-Trail
//!
//! This module provides link normalization (relative to absolute resolution),
//! seed validation and host extraction.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::extract_host;
pub use normalize::{is_absolute_http, normalize_link, validate_seed};
