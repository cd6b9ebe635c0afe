//! Search compiler — turns a user query into a reusable [`Matcher`] for both
//! filtering and span highlighting.
//!
//! - A blank query compiles to `None`: match everything, highlight nothing.
//! - Plain mode escapes every character and matches case-insensitively.
//! - Regex mode strips every inline `(?i)` marker and compiles the rest
//!   case-insensitively. An invalid pattern compiles to `None`; [`Search`]
//!   then falls back to a case-insensitive literal test of the query text,
//!   so a broken regex still filters.

use regex::{Regex, RegexBuilder};
use std::ops::Range;
use std::sync::LazyLock;

static INLINE_CASE_FLAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(\?i\)").expect("inline flag pattern must compile"));

/// A compiled, case-insensitive query.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    /// The pattern actually applied (after escaping or flag stripping).
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Every non-empty match in `text`, left to right. Empty matches are
    /// stepped over rather than reported.
    pub fn spans(&self, text: &str) -> Vec<Range<usize>> {
        self.regex
            .find_iter(text)
            .filter(|m| !m.is_empty())
            .map(|m| m.range())
            .collect()
    }
}

/// Compile `query`; see the module docs for the rules.
pub fn compile(query: &str, regex_mode: bool) -> Option<Matcher> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    let pattern = if regex_mode {
        INLINE_CASE_FLAG.replace_all(query, "").into_owned()
    } else {
        regex::escape(query)
    };

    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(regex) => {
            tracing::debug!(pattern = %pattern, regex_mode, "search: compiled");
            Some(Matcher { regex })
        }
        Err(err) => {
            tracing::warn!(pattern = %pattern, error = %err, "search: invalid pattern, using literal fallback");
            None
        }
    }
}

/// A query ready to apply, with the literal fallback for invalid regexes.
#[derive(Debug, Clone, Default)]
pub struct Search {
    matcher: Option<Matcher>,
    /// Lowercased query text, set only when regex compilation failed.
    fallback: Option<String>,
}

impl Search {
    pub fn new(query: &str, regex_mode: bool) -> Self {
        let matcher = compile(query, regex_mode);
        let trimmed = query.trim();
        let fallback = (matcher.is_none() && !trimmed.is_empty()).then(|| trimmed.to_lowercase());
        Self { matcher, fallback }
    }

    pub fn matcher(&self) -> Option<&Matcher> {
        self.matcher.as_ref()
    }

    /// `false` for a blank query: everything matches.
    pub fn is_active(&self) -> bool {
        self.matcher.is_some() || self.fallback.is_some()
    }

    /// True when an invalid regex degraded to a literal test.
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    pub fn matches(&self, text: &str) -> bool {
        match (&self.matcher, &self.fallback) {
            (Some(matcher), _) => matcher.is_match(text),
            (None, Some(needle)) => text.to_lowercase().contains(needle.as_str()),
            (None, None) => true,
        }
    }

    /// Spans to highlight; empty when there is no compiled matcher.
    pub fn highlight(&self, text: &str) -> Vec<Range<usize>> {
        self.matcher
            .as_ref()
            .map(|matcher| matcher.spans(text))
            .unwrap_or_default()
    }
}
