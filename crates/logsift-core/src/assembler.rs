//! Entry assembler — turns decoded text into an ordered sequence of
//! [`LogEntry`] values.
//!
//! Parsing runs in two passes:
//!
//! 1. a one-shot pre-scan for a *base date*, used to complete time-only
//!    installer stamps. It is fixed before any line is assembled so the
//!    result never depends on where in the file the date appears;
//! 2. a left fold over the lines with an explicit [`Assembly`] accumulator.
//!    A line that starts a recognisable record emits a new entry; any other
//!    line is merged into the most recent entry as a continuation, or
//!    dropped if no entry exists yet.
//!
//! Nothing here fails: unrecognised and malformed lines degrade to
//! continuations.

use crate::dialect::{self, Dialect, LineContext, ParsedHead};
use crate::level;
use crate::timestamp::{self, resolve_day_month, NaiveZone};
use crate::types::LogEntry;
use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use std::borrow::Cow;
use std::sync::LazyLock;

static BASE_DASHED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{4})-([0-9]{2})-([0-9]{2})\s+[0-9]{1,2}:[0-9]{2}:[0-9]{2}")
        .expect("base-date pattern must compile")
});

static BASE_SLASH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})\s+[0-9]{1,2}:[0-9]{2}:[0-9]{2}")
        .expect("base-date pattern must compile")
});

/// Options for a parse run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ParseOptions {
    /// Zone for timestamps that carry no offset.
    #[serde(default)]
    pub naive_zone: NaiveZone,
}

/// Convert `\r\n` and lone `\r` line endings to `\n`.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Find the date of the first line holding a full date followed by a time.
///
/// `YYYY-MM-DD` is checked before a slash date on each line; the first line
/// with either shape ends the scan, even if its values are not a valid date.
pub fn scan_base_date(text: &str) -> Option<NaiveDate> {
    let text = normalize_newlines(text);
    for line in text.split('\n').map(str::trim) {
        if let Some(caps) = BASE_DASHED_RE.captures(line) {
            let num = |i: usize| caps[i].parse::<u32>().ok();
            return NaiveDate::from_ymd_opt(caps[1].parse().ok()?, num(2)?, num(3)?);
        }
        if let Some(caps) = BASE_SLASH_RE.captures(line) {
            let num = |i: usize| caps[i].parse::<u32>().ok();
            let (day, month) = resolve_day_month(num(1)?, num(2)?);
            return NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month, day);
        }
    }
    None
}

/// Recognise `line` as the start of a new entry.
///
/// The timestamp grammars are tried first; the dialect recognizers only run
/// when no grammar matches.
pub fn parse_head(line: &str, ctx: &LineContext) -> Option<ParsedHead> {
    if let Some(ts) = timestamp::detect(line, ctx.zone) {
        let (level, message) = level::split_level(ts.rest);
        return Some(ParsedHead {
            dialect: Dialect::Timestamped,
            time: ts.time,
            time_raw: ts.text.to_string(),
            level,
            source: String::new(),
            message: message.to_string(),
        });
    }
    dialect::recognize(line, ctx)
}

/// Fold state: the entries emitted so far. Only `entries.last_mut()` is ever
/// touched after emission.
struct Assembly {
    ctx: LineContext,
    entries: Vec<LogEntry>,
    continued: usize,
    dropped: usize,
}

impl Assembly {
    fn new(ctx: LineContext) -> Self {
        Self {
            ctx,
            entries: Vec::new(),
            continued: 0,
            dropped: 0,
        }
    }

    fn feed(mut self, raw_line: &str) -> Self {
        let line = raw_line.trim_end();
        if line.is_empty() {
            return self;
        }

        if let Some(head) = parse_head(line, &self.ctx) {
            let index = self.entries.len();
            tracing::trace!(index, dialect = ?head.dialect, level = %head.level, "assembler: new entry");
            self.entries.push(LogEntry {
                index,
                time: head.time,
                time_raw: head.time_raw,
                level: head.level,
                source: head.source,
                message: head.message,
                raw: raw_line.to_string(),
            });
            return self;
        }

        match self.entries.last_mut() {
            Some(current) => {
                current.message.push('\n');
                current.message.push_str(line);
                current.raw.push('\n');
                current.raw.push_str(raw_line);
                self.continued += 1;
            }
            None => {
                tracing::trace!(line, "assembler: dropping line before first entry");
                self.dropped += 1;
            }
        }
        self
    }
}

/// Parse `text` with default options (naive stamps in the local zone).
pub fn parse_log(text: &str) -> Vec<LogEntry> {
    parse_log_with(text, &ParseOptions::default())
}

/// Parse `text` into entries whose `index` runs contiguously from 0.
pub fn parse_log_with(text: &str, options: &ParseOptions) -> Vec<LogEntry> {
    let text = normalize_newlines(text);
    let ctx = LineContext {
        base_date: scan_base_date(&text),
        zone: options.naive_zone,
    };

    let assembly = text
        .split('\n')
        .fold(Assembly::new(ctx), Assembly::feed);

    tracing::debug!(
        entries = assembly.entries.len(),
        continued = assembly.continued,
        dropped = assembly.dropped,
        base_date = ?ctx.base_date,
        "assembler: parse complete"
    );
    assembly.entries
}
