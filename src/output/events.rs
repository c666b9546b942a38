//! Events pushed from the traversal engine to the event sink

use crate::state::{PageRecord, StopReason};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// One visited page, delivered in completion order with a strictly increasing id
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageVisitedEvent {
    pub id: u64,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub url: String,
    pub referrer_url: Option<String>,
    pub keyword_matched: bool,
    pub depth: u32,
}

impl PageVisitedEvent {
    /// Builds the event for a freshly recorded page, stamped with the current time
    pub fn from_record(id: u64, record: &PageRecord) -> Self {
        Self::at(id, record, Utc::now())
    }

    /// Builds the event with an explicit timestamp
    pub fn at(id: u64, record: &PageRecord, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            timestamp,
            title: record.title.clone(),
            url: record.url.clone(),
            referrer_url: record.referrer_url.clone(),
            keyword_matched: record.keyword_matched,
            depth: record.depth,
        }
    }

    /// ISO-8601 timestamp with millisecond precision
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Everything the engine emits during a run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CrawlEvent {
    /// A page was visited
    PageVisited(PageVisitedEvent),

    /// The run ended; always the last event of a run
    Complete {
        reason: StopReason,
        #[serde(rename = "pagesVisited")]
        pages_visited: usize,
    },
}

impl CrawlEvent {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }
}
