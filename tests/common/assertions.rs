//! Domain-specific assertion macros for logsift harnesses.
//!
//! These add context-rich failure messages that make it clear *which*
//! normalization invariant was violated and on *which* raw line.

use logsift::{ChunkBin, LogEntry};

// ---------------------------------------------------------------------------
// Entry field assertions
// ---------------------------------------------------------------------------

/// Assert that a `LogEntry` has a specific level.
///
/// ```rust
/// assert_level!(entry, LogLevel::Error);
/// ```
#[macro_export]
macro_rules! assert_level {
    ($entry:expr, $level:expr) => {{
        let entry: &logsift::LogEntry = &$entry;
        let expected: logsift::LogLevel = $level;
        if entry.level != expected {
            panic!(
                "assert_level! failed:\n  expected: {:?}\n  actual:   {:?}\n  raw: {:?}",
                expected, entry.level, entry.raw
            );
        }
    }};
}

/// Assert the parsed instant of a `LogEntry`, as epoch milliseconds.
///
/// ```rust
/// assert_time_ms!(entry, Some(1_755_043_200_000));
/// assert_time_ms!(entry, None);
/// ```
#[macro_export]
macro_rules! assert_time_ms {
    ($entry:expr, $ms:expr) => {{
        let entry: &logsift::LogEntry = &$entry;
        let expected: Option<i64> = $ms;
        let actual = entry.time.map(|t| t.timestamp_millis());
        if actual != expected {
            panic!(
                "assert_time_ms! failed:\n  expected: {:?}\n  actual:   {:?} ({:?})\n  time_raw: {:?}\n  raw: {:?}",
                expected, actual, entry.time, entry.time_raw, entry.raw
            );
        }
    }};
}

/// Assert that a `LogEntry` has an exact message.
#[macro_export]
macro_rules! assert_message {
    ($entry:expr, $message:expr) => {{
        let entry: &logsift::LogEntry = &$entry;
        let expected: &str = $message;
        if entry.message != expected {
            panic!(
                "assert_message! failed:\n  expected: {:?}\n  actual:   {:?}\n  raw: {:?}",
                expected, entry.message, entry.raw
            );
        }
    }};
}

/// Assert that a `LogEntry` carries the expected source.
#[macro_export]
macro_rules! assert_source {
    ($entry:expr, $source:expr) => {{
        let entry: &logsift::LogEntry = &$entry;
        let expected: &str = $source;
        if entry.source != expected {
            panic!(
                "assert_source! failed:\n  expected: {:?}\n  actual:   {:?}\n  raw: {:?}",
                expected, entry.source, entry.raw
            );
        }
    }};
}

// ---------------------------------------------------------------------------
// Result set assertions
// ---------------------------------------------------------------------------

/// Assert that every entry in a filtered view satisfies a predicate.
///
/// ```rust
/// assert_rows_all!(rows, |e| e.level == LogLevel::Error);
/// ```
#[macro_export]
macro_rules! assert_rows_all {
    ($rows:expr, $pred:expr) => {{
        fn as_pred<F: Fn(&logsift::LogEntry) -> bool>(f: F) -> F {
            f
        }
        let rows: &[&logsift::LogEntry] = &$rows;
        let pred = as_pred($pred);
        let failing: Vec<usize> = rows
            .iter()
            .filter(|e| !pred(**e))
            .map(|e| e.index)
            .collect();
        if !failing.is_empty() {
            panic!(
                "assert_rows_all! failed: {} of {} rows did not satisfy predicate.\n  indices: {:?}",
                failing.len(),
                rows.len(),
                failing
            );
        }
    }};
}

// ---------------------------------------------------------------------------
// Structural invariants
// ---------------------------------------------------------------------------

/// Indices run 0, 1, 2, … with no gaps.
pub fn assert_indices_contiguous(entries: &[LogEntry]) {
    for (position, entry) in entries.iter().enumerate() {
        assert_eq!(
            entry.index, position,
            "entry at position {position} has index {}: {:?}",
            entry.index, entry.raw
        );
    }
}

/// Bins are `width_ms` wide, grid-aligned, abut one another, and their
/// per-level counts add up to their totals.
pub fn assert_bins_well_formed(bins: &[ChunkBin], width_ms: i64) {
    for (i, bin) in bins.iter().enumerate() {
        let start = bin.start.timestamp_millis();
        assert_eq!(
            (bin.end - bin.start).num_milliseconds(),
            width_ms,
            "bin {i} has the wrong width"
        );
        assert_eq!(start.rem_euclid(width_ms), 0, "bin {i} start {start} is off the grid");
        assert_eq!(
            bin.level_counts.values().sum::<usize>(),
            bin.count,
            "bin {i} level counts do not sum to its count"
        );
        if let Some(next) = bins.get(i + 1) {
            assert_eq!(bin.end, next.start, "gap between bin {i} and bin {}", i + 1);
        }
    }
}
