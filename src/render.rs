//! Terminal output for the `logsift` binary.
//!
//! Each [`OutputFormat`] turns the filtered view into one string; the caller
//! decides where it goes.

use crate::core::export::{self, time_label};
use crate::core::{ChunkBin, Filters, LogEntry, LogLevel, Search};
use std::ops::Range;

const REVERSE_ON: &str = "\x1b[7m";
const REVERSE_OFF: &str = "\x1b[27m";

/// Widest histogram bar, in cells.
const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One block per entry: time, level, source and message.
    Entries,
    /// Per-bucket counts as a text histogram.
    Timeline,
    Csv,
    /// Markdown summary of the filtered rows.
    Markdown,
    /// One JSON object per entry.
    Jsonl,
}

/// Everything a format might need.
pub struct View<'a> {
    pub rows: &'a [&'a LogEntry],
    pub bookmarked: &'a [&'a LogEntry],
    pub bins: &'a [ChunkBin],
    pub filters: &'a Filters,
    pub search: &'a Search,
    pub highlight: bool,
    pub top_messages: usize,
}

pub fn render(format: OutputFormat, view: &View<'_>) -> Result<String, serde_json::Error> {
    Ok(match format {
        OutputFormat::Entries => render_entries(view),
        OutputFormat::Timeline => render_timeline(view.bins),
        OutputFormat::Csv => export::to_csv(view.rows, view.bookmarked),
        OutputFormat::Markdown => {
            export::markdown_summary(view.rows, view.filters, view.bookmarked, view.top_messages)
        }
        OutputFormat::Jsonl => render_jsonl(view.rows)?,
    })
}

/// Wrap each span of `text` in reverse video. Spans must be sorted and
/// non-overlapping, as [`Search::highlight`] returns them.
pub fn highlight_spans(text: &str, spans: &[Range<usize>]) -> String {
    let mut out = String::with_capacity(text.len() + spans.len() * 8);
    let mut cursor = 0;
    for span in spans {
        out.push_str(&text[cursor..span.start]);
        out.push_str(REVERSE_ON);
        out.push_str(&text[span.clone()]);
        out.push_str(REVERSE_OFF);
        cursor = span.end;
    }
    out.push_str(&text[cursor..]);
    out
}

pub fn render_entry(entry: &LogEntry, search: &Search, highlight: bool) -> String {
    let message = if highlight {
        highlight_spans(&entry.message, &search.highlight(&entry.message))
    } else {
        entry.message.clone()
    };
    let time = time_label(entry);
    let mut line = String::new();
    if !time.is_empty() {
        line.push_str(&time);
        line.push(' ');
    }
    line.push_str(&format!("{:<5} ", entry.level.as_str()));
    if !entry.source.is_empty() {
        line.push_str(&format!("[{}] ", entry.source));
    }
    line.push_str(&message);
    line
}

fn render_entries(view: &View<'_>) -> String {
    let mut out = String::new();
    for entry in view.rows {
        out.push_str(&render_entry(entry, view.search, view.highlight));
        out.push('\n');
    }
    out
}

/// One line per bin: start time, a bar scaled to the busiest bin, the count
/// and a per-level breakdown.
pub fn render_timeline(bins: &[ChunkBin]) -> String {
    let max = bins.iter().map(|b| b.count).max().unwrap_or(0);
    let mut out = String::new();
    for bin in bins {
        let cells = if max == 0 { 0 } else { bin.count * BAR_WIDTH / max };
        let breakdown = LogLevel::ALL
            .into_iter()
            .filter_map(|level| match bin.level_count(level) {
                0 => None,
                n => Some(format!("{level}={n}")),
            })
            .collect::<Vec<_>>()
            .join(" ");
        let line = format!(
            "{} |{:<width$}| {}",
            bin.start.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            "#".repeat(cells),
            bin.count,
            width = BAR_WIDTH
        );
        out.push_str(line.trim_end());
        if !breakdown.is_empty() {
            out.push(' ');
            out.push_str(&breakdown);
        }
        out.push('\n');
    }
    out
}

fn render_jsonl(rows: &[&LogEntry]) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for row in rows {
        out.push_str(&serde_json::to_string(row)?);
        out.push('\n');
    }
    Ok(out)
}
