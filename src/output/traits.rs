//! Event sink trait
//!
//! Consumers of a crawl (record log, console, live-update stream) implement
//! `EventSink` and are fed the events read from a run's channel in order.

use crate::output::events::{CrawlEvent, PageVisitedEvent};
use crate::state::StopReason;
use crate::TrailError;

/// Trait for consumers of crawl events
pub trait EventSink {
    /// Called once per visited page, in event-id order
    fn page_visited(&mut self, event: &PageVisitedEvent) -> Result<(), TrailError>;

    /// Called once when the run ends
    fn crawl_complete(&mut self, reason: StopReason, pages_visited: usize)
        -> Result<(), TrailError>;

    /// Dispatches a channel event to the matching callback
    fn handle(&mut self, event: &CrawlEvent) -> Result<(), TrailError> {
        match event {
            CrawlEvent::PageVisited(page) => self.page_visited(page),
            CrawlEvent::Complete {
                reason,
                pages_visited,
            } => self.crawl_complete(*reason, *pages_visited),
        }
    }
}

/// Sink that keeps every event in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub pages: Vec<PageVisitedEvent>,
    pub completion: Option<(StopReason, usize)>,
}

impl EventSink for CollectingSink {
    fn page_visited(&mut self, event: &PageVisitedEvent) -> Result<(), TrailError> {
        self.pages.push(event.clone());
        Ok(())
    }

    fn crawl_complete(
        &mut self,
        reason: StopReason,
        pages_visited: usize,
    ) -> Result<(), TrailError> {
        self.completion = Some((reason, pages_visited));
        Ok(())
    }
}
