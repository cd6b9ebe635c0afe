//! Partitions timestamped entries into contiguous fixed-width windows for
//! the histogram. Windows are half-open.
//!
//! The grid is anchored at the Unix epoch: a bin starts at
//! `floor(t / width) * width` milliseconds. Entries without a parsed `time`
//! are ignored entirely.

use crate::types::{ChunkBin, LogEntry, LogLevel};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Widths offered by the timeline, in milliseconds.
pub const PRESET_WIDTHS_MS: [i64; 6] = [1_000, 5_000, 15_000, 30_000, 60_000, 300_000];

/// Floor `t_ms` onto the bucket grid, rounding toward negative infinity.
pub fn floor_to_grid(t_ms: i64, width_ms: i64) -> i64 {
    t_ms.div_euclid(width_ms) * width_ms
}

/// Number of bins [`bucket`] would produce, computed without allocating.
///
/// Zero when no entry has a time or `width_ms` is not positive.
pub fn bin_count(entries: &[LogEntry], width_ms: i64) -> u64 {
    if width_ms <= 0 {
        return 0;
    }
    let mut stamps = entries.iter().filter_map(|e| e.time.map(|t| t.timestamp_millis()));
    let Some(first) = stamps.next() else {
        return 0;
    };
    let (min, max) = stamps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
    let span = floor_to_grid(max, width_ms) - floor_to_grid(min, width_ms);
    (span / width_ms) as u64 + 1
}

/// Bucket `entries` into bins of `width_ms`.
///
/// Bins run from the bin holding the earliest timestamp through the bin
/// holding the latest, with no gaps, in chronological order. Returns no bins
/// when no entry has a time (insufficient data, not "all zero") or when
/// `width_ms` is not positive.
///
/// Every bin is allocated, so memory grows with `(max - min) / width_ms`.
/// One stray stamp decades away from the rest at a 1s width asks for
/// billions of bins and will exhaust memory. Check [`bin_count`] first when
/// the input is untrusted.
pub fn bucket(entries: &[LogEntry], width_ms: i64) -> Vec<ChunkBin> {
    if width_ms <= 0 {
        tracing::warn!(width_ms, "timeline: bucket width must be positive");
        return Vec::new();
    }

    let stamped: Vec<(i64, LogLevel)> = entries
        .iter()
        .filter_map(|e| e.time.map(|t| (t.timestamp_millis(), e.level)))
        .collect();
    let (Some(min), Some(max)) = (
        stamped.iter().map(|(t, _)| *t).min(),
        stamped.iter().map(|(t, _)| *t).max(),
    ) else {
        return Vec::new();
    };

    let grid_start = floor_to_grid(min, width_ms);
    let grid_last = floor_to_grid(max, width_ms);

    let mut bins = Vec::new();
    let mut start = grid_start;
    while start <= grid_last {
        let Some(end) = start.checked_add(width_ms) else {
            break;
        };
        let (Some(start_at), Some(end_at)) = (instant(start), instant(end)) else {
            break;
        };
        bins.push(ChunkBin {
            start: start_at,
            end: end_at,
            count: 0,
            level_counts: BTreeMap::new(),
        });
        start = end;
    }

    for (t, level) in &stamped {
        let idx = ((t - grid_start) / width_ms) as usize;
        if let Some(bin) = bins.get_mut(idx) {
            bin.count += 1;
            *bin.level_counts.entry(*level).or_insert(0) += 1;
        }
    }

    tracing::debug!(
        width_ms,
        bins = bins.len(),
        stamped = stamped.len(),
        "timeline: bucketed"
    );
    bins
}

fn instant(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}

// ---------------------------------------------------------------------------
// Width parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidthParseError {
    #[error("invalid bucket width {0:?}: expected a number with ms, s, m or h")]
    Invalid(String),
    #[error("bucket width {0:?} must be greater than zero")]
    NonPositive(String),
}

/// A positive bucket width, written as `250ms`, `5s`, `1m`, `2h` or bare
/// milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct BucketWidth(i64);

impl BucketWidth {
    pub const MINUTE: BucketWidth = BucketWidth(60_000);

    pub fn from_millis(ms: i64) -> Option<Self> {
        (ms > 0).then_some(BucketWidth(ms))
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

impl Default for BucketWidth {
    fn default() -> Self {
        Self::MINUTE
    }
}

impl std::str::FromStr for BucketWidth {
    type Err = WidthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || WidthParseError::Invalid(s.to_string());
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, unit) = s.split_at(split);
        let value: i64 = digits.parse().map_err(|_| invalid())?;
        let scale = match unit.trim() {
            "" | "ms" => 1,
            "s" => 1_000,
            "m" | "min" => 60_000,
            "h" => 3_600_000,
            _ => return Err(invalid()),
        };
        let ms = value.checked_mul(scale).ok_or_else(invalid)?;
        BucketWidth::from_millis(ms).ok_or_else(|| WidthParseError::NonPositive(s.to_string()))
    }
}

impl TryFrom<String> for BucketWidth {
    type Error = WidthParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for BucketWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ms = self.0;
        if ms % 3_600_000 == 0 {
            write!(f, "{}h", ms / 3_600_000)
        } else if ms % 60_000 == 0 {
            write!(f, "{}m", ms / 60_000)
        } else if ms % 1_000 == 0 {
            write!(f, "{}s", ms / 1_000)
        } else {
            write!(f, "{ms}ms")
        }
    }
}
