//! State module for tracking crawl progress
//!
//! This module provides the per-run state of the traversal engine.
//!
//! # Components
//!
//! - `RunStatus`: Lifecycle of a run (idle, running, completed, stopped, failed)
//! - `StopReason`: Why a run ended
//! - `RunState`: Visited list, frontier, visited set and event counter of one run
//! - `PageRecord`: One visited page

mod run_state;
mod run_status;

// Re-export main types
pub use run_state::{EnqueueSummary, PageRecord, RunState};
pub use run_status::{RunStatus, StopReason};
