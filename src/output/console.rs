//! Human-readable and JSON-lines event output

use crate::output::events::{CrawlEvent, PageVisitedEvent};
use crate::output::traits::EventSink;
use crate::state::StopReason;
use crate::TrailError;
use std::io::Write;

/// Line format of the console sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleFormat {
    /// `#id [depth] title <url>`
    Text,
    /// One JSON object per event
    Json,
}

/// Writes one line per event
pub struct ConsoleSink<W: Write> {
    writer: W,
    format: ConsoleFormat,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W, format: ConsoleFormat) -> Self {
        Self { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Formats a page event for the text console
pub fn format_text_line(event: &PageVisitedEvent) -> String {
    let marker = if event.keyword_matched { " *" } else { "" };
    let title = if event.title.is_empty() {
        "(untitled)"
    } else {
        event.title.as_str()
    };
    format!(
        "#{} [{}] {} <{}>{}",
        event.id, event.depth, title, event.url, marker
    )
}

impl<W: Write> EventSink for ConsoleSink<W> {
    fn page_visited(&mut self, event: &PageVisitedEvent) -> Result<(), TrailError> {
        match self.format {
            ConsoleFormat::Text => writeln!(self.writer, "{}", format_text_line(event))?,
            ConsoleFormat::Json => {
                let line = serde_json::to_string(&CrawlEvent::PageVisited(event.clone()))?;
                writeln!(self.writer, "{}", line)?;
            }
        }
        Ok(())
    }

    fn crawl_complete(&mut self, reason: StopReason, pages_visited: usize) -> Result<(), TrailError> {
        match self.format {
            ConsoleFormat::Text => writeln!(
                self.writer,
                "Crawl complete: {} ({} pages)",
                reason, pages_visited
            )?,
            ConsoleFormat::Json => {
                let line = serde_json::to_string(&CrawlEvent::Complete {
                    reason,
                    pages_visited,
                })?;
                writeln!(self.writer, "{}", line)?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}
