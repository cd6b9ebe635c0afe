//! Test builders — ergonomic constructors for `LogEntry` values and parse
//! options.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use chrono::{DateTime, Utc};
use logsift::{LogEntry, LogLevel, NaiveZone, ParseOptions};

// ---------------------------------------------------------------------------
// LogEntryBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`LogEntry`] test fixtures.
///
/// # Example
///
/// ```rust
/// let entry = LogEntryBuilder::new("timeout connecting to db")
///     .index(3)
///     .level(LogLevel::Error)
///     .at_ms(1_755_043_200_000)
///     .source("api")
///     .build();
/// ```
pub struct LogEntryBuilder {
    index: usize,
    time: Option<DateTime<Utc>>,
    time_raw: Option<String>,
    level: LogLevel,
    source: String,
    message: String,
}

impl LogEntryBuilder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            index: 0,
            time: None,
            time_raw: None,
            level: LogLevel::Info,
            source: String::new(),
            message: message.into(),
        }
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the instant from epoch milliseconds.
    pub fn at_ms(mut self, ms: i64) -> Self {
        self.time = Some(DateTime::from_timestamp_millis(ms).expect("ms in chrono range"));
        self
    }

    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.time = Some(time);
        self
    }

    /// Override the raw timestamp text. Defaults to the RFC 3339 form of the
    /// instant, or empty when there is none.
    pub fn time_raw(mut self, raw: impl Into<String>) -> Self {
        self.time_raw = Some(raw.into());
        self
    }

    pub fn build(self) -> LogEntry {
        let time_raw = self
            .time_raw
            .unwrap_or_else(|| self.time.map(|t| t.to_rfc3339()).unwrap_or_default());
        let raw = if time_raw.is_empty() {
            format!("{} {}", self.level, self.message)
        } else {
            format!("{time_raw} {} {}", self.level, self.message)
        };
        LogEntry {
            index: self.index,
            time: self.time,
            time_raw,
            level: self.level,
            source: self.source,
            message: self.message,
            raw,
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// Build an INFO entry.
pub fn info_entry(message: &str) -> LogEntry {
    LogEntryBuilder::new(message).level(LogLevel::Info).build()
}

/// Build an ERROR entry.
pub fn error_entry(message: &str) -> LogEntry {
    LogEntryBuilder::new(message).level(LogLevel::Error).build()
}

/// Build entries from `(epoch ms, level, message)` triples, indexed in order.
/// A `None` time yields an untimed entry.
pub fn timed_entries(specs: &[(Option<i64>, LogLevel, &str)]) -> Vec<LogEntry> {
    specs
        .iter()
        .enumerate()
        .map(|(index, (ms, level, message))| {
            let builder = LogEntryBuilder::new(*message).index(index).level(*level);
            match ms {
                Some(ms) => builder.at_ms(*ms).build(),
                None => builder.build(),
            }
        })
        .collect()
}

/// Build a corpus of `n` entries one second apart, alternating
/// ERROR/WARN/INFO with a message repeating every 7 lines.
pub fn build_corpus(n: usize) -> Vec<LogEntry> {
    (0..n)
        .map(|i| {
            let level = match i % 10 {
                0 => LogLevel::Error,
                1 | 2 => LogLevel::Warn,
                _ => LogLevel::Info,
            };
            LogEntryBuilder::new(format!("log line {}", i % 7))
                .index(i)
                .level(level)
                .at_ms(1_755_043_200_000 + i as i64 * 1_000)
                .source(format!("worker-{}", i % 3))
                .build()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parse options
// ---------------------------------------------------------------------------

/// Options that read naive stamps as UTC, so expectations are host-independent.
pub fn utc_options() -> ParseOptions {
    ParseOptions {
        naive_zone: NaiveZone::Utc,
    }
}

/// Parse `text` with [`utc_options`].
pub fn parse_utc(text: &str) -> Vec<LogEntry> {
    logsift::parse_log_with(text, &utc_options())
}
