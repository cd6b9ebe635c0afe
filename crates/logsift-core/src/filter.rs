//! Entry filtering and bookmarks over an assembled entry sequence.
//!
//! Filters are read-only views: they borrow entries and never reorder them.

use crate::search::Search;
use crate::types::{LogEntry, LogLevel, TimeRange};
use std::collections::BTreeSet;

/// The active view: enabled levels, search query and optional time window.
#[derive(Debug, Clone, PartialEq)]
pub struct Filters {
    pub levels: BTreeSet<LogLevel>,
    pub query: String,
    /// Interpret `query` as a regex rather than literal text.
    pub regex: bool,
    pub time_range: Option<TimeRange>,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            levels: LogLevel::ALL
                .into_iter()
                .filter(|level| *level != LogLevel::Unknown)
                .collect(),
            query: String::new(),
            regex: false,
            time_range: None,
        }
    }
}

impl Filters {
    /// Flip one level on or off.
    pub fn toggle_level(&mut self, level: LogLevel) {
        if !self.levels.remove(&level) {
            self.levels.insert(level);
        }
    }

    pub fn search(&self) -> Search {
        Search::new(&self.query, self.regex)
    }

    /// Entries passing every active filter, in their original order.
    pub fn apply<'a>(&self, entries: &'a [LogEntry]) -> Vec<&'a LogEntry> {
        self.apply_with(&self.search(), entries)
    }

    /// As [`Filters::apply`], reusing an already compiled search.
    pub fn apply_with<'a>(&self, search: &Search, entries: &'a [LogEntry]) -> Vec<&'a LogEntry> {
        let kept: Vec<&LogEntry> = entries
            .iter()
            .filter(|entry| self.admits(search, entry))
            .collect();
        tracing::debug!(total = entries.len(), kept = kept.len(), "filter: applied");
        kept
    }

    fn admits(&self, search: &Search, entry: &LogEntry) -> bool {
        if !self.levels.contains(&entry.level) {
            return false;
        }
        if let Some(range) = &self.time_range {
            // Entries without a time cannot be placed in the window.
            match entry.time {
                Some(t) if range.contains(t) => {}
                _ => return false,
            }
        }
        !search.is_active() || search.matches(&entry.haystack())
    }
}

/// A set of bookmarked entry indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bookmarks(BTreeSet<usize>);

impl Bookmarks {
    /// Add or remove `index`; returns whether it is now bookmarked.
    pub fn toggle(&mut self, index: usize) -> bool {
        if self.0.remove(&index) {
            false
        } else {
            self.0.insert(index);
            true
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Bookmarked entries in index order.
    pub fn select<'a>(&self, entries: &'a [LogEntry]) -> Vec<&'a LogEntry> {
        entries.iter().filter(|e| self.contains(e.index)).collect()
    }
}

impl FromIterator<usize> for Bookmarks {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Bookmarks(iter.into_iter().collect())
    }
}
