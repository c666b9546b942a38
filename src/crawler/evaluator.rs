//! Stop-condition evaluation
//!
//! A pure function over a snapshot of run state, consulted after every
//! completed fetch. Precedence, highest first:
//!
//! | # | Condition | Reason |
//! |---|-----------|--------|
//! | 1 | keyword configured and last page matched | `KeywordFound` |
//! | 2 | pages visited >= page cap | `MaxPagesReached` |
//! | 3 | last page depth > limit | `LimitReached` |
//! | 4 | frontier empty within limit, nothing in flight | `LimitReached` if links were cut off by the limit, else `Exhausted` |

use crate::state::{PageRecord, StopReason};

/// Outcome of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopDecision {
    Continue,
    Stop(StopReason),
}

impl StopDecision {
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop(_))
    }
}

/// Snapshot of the run state the evaluator needs
#[derive(Debug, Clone, Copy)]
pub struct StopCheck<'a> {
    /// The page recorded by the fetch that just completed, if it succeeded
    pub last_page: Option<&'a PageRecord>,

    /// Length of the visited list
    pub pages_visited: usize,

    /// No pending frontier entries at any depth within the limit
    pub frontier_exhausted: bool,

    /// Fetches started but not yet applied
    pub in_flight: usize,

    /// Some discovered link was dropped for lying beyond the limit
    pub links_beyond_limit: bool,

    pub limit: u32,
    pub max_total_pages: usize,
    pub keyword_configured: bool,
}

/// Decides whether the run continues
pub fn evaluate(check: &StopCheck<'_>) -> StopDecision {
    if let Some(page) = check.last_page {
        if check.keyword_configured && page.keyword_matched {
            return StopDecision::Stop(StopReason::KeywordFound);
        }
    }

    if check.pages_visited >= check.max_total_pages {
        return StopDecision::Stop(StopReason::MaxPagesReached);
    }

    if check.last_page.is_some_and(|page| page.depth > check.limit) {
        return StopDecision::Stop(StopReason::LimitReached);
    }

    if check.frontier_exhausted && check.in_flight == 0 {
        return if check.links_beyond_limit {
            StopDecision::Stop(StopReason::LimitReached)
        } else {
            StopDecision::Stop(StopReason::Exhausted)
        };
    }

    StopDecision::Continue
}
