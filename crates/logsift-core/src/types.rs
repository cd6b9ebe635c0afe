//! Core types for logsift-core.
//!
//! This module defines the data structures shared by every stage of the
//! engine: the assembled [`LogEntry`], its [`LogLevel`], the histogram
//! [`ChunkBin`] and the half-open [`TimeRange`] used to select bins.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// One logical record assembled from one or more consecutive raw lines.
///
/// Only the most recently emitted entry is ever mutated, and only by
/// continuation merges. Once the assembler finishes, treat the sequence as
/// read-only: bucket assignments and bookmarks are keyed on its final state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Position in the emitted sequence, contiguous from 0.
    pub index: usize,
    /// Parsed instant, `None` when no timestamp could be turned into one.
    pub time: Option<DateTime<Utc>>,
    /// The exact text recognised as the timestamp, or empty.
    pub time_raw: String,
    pub level: LogLevel,
    /// Origin tag extracted by a dialect (process name, client IP, thread id).
    pub source: String,
    /// Message body; continuation lines are appended newline-separated.
    pub message: String,
    /// The unmodified line(s) backing this entry, newline-joined.
    pub raw: String,
}

impl LogEntry {
    /// The text searched by filters: `"<time_raw> <LEVEL> <message>"`.
    pub fn haystack(&self) -> String {
        format!("{} {} {}", self.time_raw, self.level, self.message)
    }
}

/// Log severity level, normalised across all dialects.
///
/// Variants are declared in display order, which is also the iteration order
/// of per-level maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    Unknown,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
        LogLevel::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
            LogLevel::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level {0:?}")]
pub struct LevelParseError(pub String);

impl std::str::FromStr for LogLevel {
    type Err = LevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LevelParseError(s.to_string()))
    }
}

/// A half-open window of time: `start <= t < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

/// One fixed-width time window of the histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkBin {
    pub start: DateTime<Utc>,
    /// Exclusive upper bound; `end - start` is the bucket width.
    pub end: DateTime<Utc>,
    /// Entries whose `time` falls in `[start, end)`.
    pub count: usize,
    /// Sparse per-level tallies; absent levels count as zero.
    pub level_counts: BTreeMap<LogLevel, usize>,
}

impl ChunkBin {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }

    pub fn level_count(&self, level: LogLevel) -> usize {
        self.level_counts.get(&level).copied().unwrap_or(0)
    }
}
