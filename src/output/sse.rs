//! Server-sent-events framing for live-update consumers
//!
//! Page events become `id: <id>` / `data: <json>` frames; the end of a run
//! becomes a `close` event with id `-1`. Serving the frames is up to the host.

use crate::output::events::PageVisitedEvent;
use crate::output::traits::EventSink;
use crate::state::StopReason;
use crate::TrailError;
use std::io::Write;

/// Frame sent after the last page event
pub const CLOSE_FRAME: &str = "event: close\nid: -1\ndata: end\n\n";

/// Encodes one page event as an SSE frame
pub fn encode_page_event(event: &PageVisitedEvent) -> Result<String, TrailError> {
    let data = serde_json::to_string(event)?;
    Ok(format!("id: {}\ndata: {}\n\n", event.id, data))
}

/// Sink writing SSE frames to any writer
pub struct SseSink<W: Write> {
    writer: W,
}

impl<W: Write> SseSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for SseSink<W> {
    fn page_visited(&mut self, event: &PageVisitedEvent) -> Result<(), TrailError> {
        self.writer.write_all(encode_page_event(event)?.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    fn crawl_complete(&mut self, _reason: StopReason, _pages_visited: usize) -> Result<(), TrailError> {
        self.writer.write_all(CLOSE_FRAME.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PageRecord;

    fn event() -> PageVisitedEvent {
        let record = PageRecord {
            url: "https://example.com/".to_string(),
            referrer_url: None,
            title: "Home".to_string(),
            keyword_matched: false,
            depth: 0,
        };
        PageVisitedEvent::from_record(3, &record)
    }

    #[test]
    fn test_encode_page_event() {
        let frame = encode_page_event(&event()).unwrap();
        assert!(frame.starts_with("id: 3\ndata: {"));
        assert!(frame.ends_with("}\n\n"));
        assert!(frame.contains("\"url\":\"https://example.com/\""));
    }

    #[test]
    fn test_sink_writes_frames_then_close() {
        let mut sink = SseSink::new(Vec::new());
        sink.page_visited(&event()).unwrap();
        sink.crawl_complete(StopReason::Exhausted, 1).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(text.starts_with("id: 3\n"));
        assert!(text.ends_with(CLOSE_FRAME));
    }
}
