//! Per-run mutable state
//!
//! `RunState` lives exactly as long as one crawl invocation. The engine
//! mutates it only from its single sequential apply step; fetch tasks never
//! see it.

use crate::crawler::{Frontier, FrontierEntry, VisitedSet};
use crate::state::{RunStatus, StopReason};
use crate::TrailError;

/// One fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    /// Canonical absolute URL
    pub url: String,

    /// Page the link was found on; `None` for the seed
    pub referrer_url: Option<String>,

    /// Whitespace-normalized `<title>` text
    pub title: String,

    pub keyword_matched: bool,

    /// Hops from the seed; the depth of the frontier entry that produced it
    pub depth: u32,
}

/// Result of enqueueing one page's links
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnqueueSummary {
    /// New entries pushed into the frontier
    pub enqueued: usize,

    /// Links skipped because they were already reserved
    pub duplicates: usize,

    /// Links dropped because they would lie beyond the limit
    pub beyond_limit: usize,
}

/// All mutable state of one crawl run
#[derive(Debug)]
pub struct RunState {
    status: RunStatus,
    pages: Vec<PageRecord>,
    frontier: Frontier,
    visited: VisitedSet,
    last_event_id: u64,
    links_beyond_limit: bool,
    stop_reason: Option<StopReason>,
}

impl RunState {
    /// Creates an idle run whose frontier accepts depths `0..=limit`
    pub fn new(limit: u32) -> Self {
        Self {
            status: RunStatus::Idle,
            pages: Vec::new(),
            frontier: Frontier::new(limit),
            visited: VisitedSet::new(),
            last_event_id: 0,
            links_beyond_limit: false,
            stop_reason: None,
        }
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Moves the run to `next`, rejecting transitions the state machine forbids
    pub fn transition(&mut self, next: RunStatus) -> Result<(), TrailError> {
        if !self.status.can_transition_to(next) {
            return Err(TrailError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        tracing::debug!("Run status {} -> {}", self.status, next);
        self.status = next;
        Ok(())
    }

    /// Reserves the seed, puts it at depth 0 and starts the run
    pub fn start(&mut self, seed_url: &str) -> Result<(), TrailError> {
        self.transition(RunStatus::Running)?;
        self.visited.reserve(seed_url);
        self.frontier.push_at(FrontierEntry::seed(seed_url));
        Ok(())
    }

    /// Appends a visited page and returns its event sequence id
    pub fn record_page(&mut self, record: PageRecord) -> u64 {
        self.last_event_id += 1;
        self.pages.push(record);
        self.last_event_id
    }

    /// Reserves and enqueues the links found on a page at `referrer_depth + 1`
    pub fn enqueue_links(
        &mut self,
        referrer_url: &str,
        referrer_depth: u32,
        links: Vec<String>,
    ) -> EnqueueSummary {
        let mut summary = EnqueueSummary::default();
        let child_depth = referrer_depth + 1;

        for link in links {
            // Already-known pages never count towards the beyond-limit flag
            if self.visited.contains(&link) {
                summary.duplicates += 1;
                continue;
            }
            if child_depth > self.frontier.limit() {
                summary.beyond_limit += 1;
                continue;
            }
            self.visited.reserve(&link);
            self.frontier
                .push_at(FrontierEntry::child_of(link, referrer_url, referrer_depth));
            summary.enqueued += 1;
        }

        if summary.beyond_limit > 0 {
            self.links_beyond_limit = true;
        }
        summary
    }

    /// Marks the run stopped; the first reason wins
    pub fn stop(&mut self, reason: StopReason) {
        if self.stop_reason.is_none() {
            self.stop_reason = Some(reason);
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_reason.is_some()
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<PageRecord> {
        self.pages
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn frontier_mut(&mut self) -> &mut Frontier {
        &mut self.frontier
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Sequence id of the last recorded page (0 before any)
    pub fn last_event_id(&self) -> u64 {
        self.last_event_id
    }

    /// True once any discovered link was dropped for lying beyond the limit
    pub fn links_beyond_limit(&self) -> bool {
        self.links_beyond_limit
    }
}
