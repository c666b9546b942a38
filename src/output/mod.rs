//! Output module for crawl events and summaries
//!
//! This module handles:
//! - The events a run emits (`PageVisitedEvent`, terminal `Complete`)
//! - The `EventSink` trait and its implementations (record log, console, SSE)
//! - End-of-run statistics

mod console;
mod events;
mod record_log;
mod sse;
pub mod stats;
mod traits;

pub use console::{format_text_line, ConsoleFormat, ConsoleSink};
pub use events::{CrawlEvent, PageVisitedEvent};
pub use record_log::{
    format_record_line, record_log_file_name, RecordLog, RECORD_HEADER, RECORD_SEPARATOR,
};
pub use sse::{encode_page_event, SseSink, CLOSE_FRAME};
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{CollectingSink, EventSink};
