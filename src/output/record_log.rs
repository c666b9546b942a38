//! Per-run record log
//!
//! One file per run, named after the run start time, holding a header line and
//! one `||`-delimited line per visited page:
//!
//! ```text
//! timestamp||title||url||keywordFound||depth
//! 2024-03-09T12:30:05.000Z||Home||https://example.com/||false||0
//! ```

use crate::output::events::PageVisitedEvent;
use crate::output::traits::EventSink;
use crate::state::StopReason;
use crate::TrailError;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Field separator of record lines
pub const RECORD_SEPARATOR: &str = "||";

/// First line of every record log
pub const RECORD_HEADER: &str = "timestamp||title||url||keywordFound||depth";

/// Formats one record line (without the trailing newline)
///
/// A `|` inside the title becomes `¦` and inside the URL becomes `%7C`, so
/// every line splits into exactly five fields.
pub fn format_record_line(event: &PageVisitedEvent) -> String {
    [
        event.timestamp_iso(),
        event.title.replace('|', "\u{a6}"),
        event.url.replace('|', "%7C"),
        event.keyword_matched.to_string(),
        event.depth.to_string(),
    ]
    .join(RECORD_SEPARATOR)
}

/// File name for a run started at `started`: ISO timestamp with `.` and `:` replaced by `-`
pub fn record_log_file_name(started: DateTime<Utc>) -> String {
    let stamp = started
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(|c: char| c == '.' || c == ':', "-");
    format!("{}.log", stamp)
}

/// Writer of record logs
pub struct RecordLog<W: Write> {
    writer: W,
    lines: usize,
}

impl RecordLog<BufWriter<File>> {
    /// Creates `directory` if needed and opens a new log file for a run
    pub fn create(directory: &Path, started: DateTime<Utc>) -> Result<(Self, PathBuf), TrailError> {
        fs::create_dir_all(directory)?;
        let path = directory.join(record_log_file_name(started));
        let file = File::options().create(true).append(true).open(&path)?;
        tracing::info!("Writing record log to {}", path.display());
        Ok((Self::new(BufWriter::new(file))?, path))
    }
}

impl<W: Write> RecordLog<W> {
    /// Wraps a writer and writes the header line
    pub fn new(mut writer: W) -> Result<Self, TrailError> {
        writeln!(writer, "{}", RECORD_HEADER)?;
        Ok(Self { writer, lines: 0 })
    }

    /// Number of record lines written so far
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for RecordLog<W> {
    fn page_visited(&mut self, event: &PageVisitedEvent) -> Result<(), TrailError> {
        writeln!(self.writer, "{}", format_record_line(event))?;
        self.lines += 1;
        Ok(())
    }

    fn crawl_complete(&mut self, reason: StopReason, pages_visited: usize) -> Result<(), TrailError> {
        tracing::debug!(
            "Record log closed after {} lines ({}, {} pages)",
            self.lines,
            reason,
            pages_visited
        );
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PageRecord;
    use chrono::TimeZone;

    fn event(title: &str, keyword_matched: bool) -> PageVisitedEvent {
        let record = PageRecord {
            url: "https://example.com/".to_string(),
            referrer_url: None,
            title: title.to_string(),
            keyword_matched,
            depth: 2,
        };
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 5).unwrap();
        PageVisitedEvent::at(1, &record, ts)
    }

    #[test]
    fn test_format_record_line() {
        assert_eq!(
            format_record_line(&event("Home", true)),
            "2024-03-09T12:30:05.000Z||Home||https://example.com/||true||2"
        );
    }

    #[test]
    fn test_separator_in_title_is_defused() {
        let line = format_record_line(&event("a||b", false));
        assert_eq!(line.matches(RECORD_SEPARATOR).count(), 4);
    }

    #[test]
    fn test_odd_pipe_run_in_title_keeps_five_fields() {
        let line = format_record_line(&event("a|||b", false));
        let fields: Vec<_> = line.split(RECORD_SEPARATOR).collect();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[1], "a\u{a6}\u{a6}\u{a6}b");
    }

    #[test]
    fn test_pipe_in_url_is_escaped() {
        let mut page = event("Home", false);
        page.url = "https://example.com/?q=a||b|".to_string();

        let line = format_record_line(&page);
        let fields: Vec<_> = line.split(RECORD_SEPARATOR).collect();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[2], "https://example.com/?q=a%7C%7Cb%7C");
    }

    #[test]
    fn test_file_name() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 5).unwrap();
        assert_eq!(record_log_file_name(ts), "2024-03-09T12-30-05-000Z.log");
    }

    #[test]
    fn test_writes_header_and_lines() {
        let mut log = RecordLog::new(Vec::new()).unwrap();
        log.page_visited(&event("Home", false)).unwrap();
        log.crawl_complete(StopReason::Exhausted, 1).unwrap();
        assert_eq!(log.lines(), 1);

        let text = String::from_utf8(log.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], RECORD_HEADER);
        assert_eq!(
            lines[1],
            "2024-03-09T12:30:05.000Z||Home||https://example.com/||false||2"
        );
    }

    #[test]
    fn test_create_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("logs");
        let ts = Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 5).unwrap();

        let (mut log, path) = RecordLog::create(&nested, ts).unwrap();
        log.page_visited(&event("Home", false)).unwrap();
        log.crawl_complete(StopReason::Exhausted, 1).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(RECORD_HEADER));
        assert_eq!(content.lines().count(), 2);
    }
}
