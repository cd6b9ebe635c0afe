//! Extracts a severity token from the text left after the timestamp has
//! been removed.
//!
//! Two mechanisms, tried in order:
//!
//! 1. a single-character symbolic prefix (`.` debug, `-` trace, `*` info,
//!    `#` warn) followed by whitespace at the start of the text, as written
//!    by Redis;
//! 2. a case-insensitive, word-bounded, optionally bracketed token from
//!    {ERROR, ERR, WARN, WARNING, INFO, DEBUG, TRACE} anywhere in the text.

use crate::types::LogLevel;
use phf::phf_map;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([.*#-])\s").expect("symbol pattern must compile"));

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\[)?\b(ERROR|ERR|WARN|WARNING|INFO|DEBUG|TRACE)\b(\])?")
        .expect("level pattern must compile")
});

static TOKENS: phf::Map<&'static str, LogLevel> = phf_map! {
    "ERROR" => LogLevel::Error,
    "ERR" => LogLevel::Error,
    "WARN" => LogLevel::Warn,
    "WARNING" => LogLevel::Warn,
    "INFO" => LogLevel::Info,
    "DEBUG" => LogLevel::Debug,
    "TRACE" => LogLevel::Trace,
};

/// A severity found in the remainder of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelMatch {
    pub level: LogLevel,
    /// Byte span of the token (with brackets or symbol padding) to strip.
    pub span: Range<usize>,
}

/// Map a level word (`ERR`, `warning`, ...) to its level.
pub fn level_from_token(token: &str) -> Option<LogLevel> {
    TOKENS.get(token.to_ascii_uppercase().as_str()).copied()
}

/// Map a single-letter severity code as used by runtime loggers and
/// structured JSON logs.
pub fn level_from_letter(letter: char) -> Option<LogLevel> {
    match letter.to_ascii_uppercase() {
        'F' | 'E' => Some(LogLevel::Error),
        'W' => Some(LogLevel::Warn),
        'I' => Some(LogLevel::Info),
        'D' => Some(LogLevel::Debug),
        'T' => Some(LogLevel::Trace),
        _ => None,
    }
}

fn level_from_symbol(symbol: &str) -> LogLevel {
    match symbol {
        "." => LogLevel::Debug,
        "-" => LogLevel::Trace,
        "#" => LogLevel::Warn,
        _ => LogLevel::Info,
    }
}

/// Find the severity in `rest`, if any.
pub fn classify(rest: &str) -> Option<LevelMatch> {
    if let Some(caps) = SYMBOL_RE.captures(rest) {
        return Some(LevelMatch {
            level: level_from_symbol(&caps[1]),
            span: caps.get(0)?.range(),
        });
    }
    let caps = WORD_RE.captures(rest)?;
    Some(LevelMatch {
        level: level_from_token(&caps[2]).unwrap_or(LogLevel::Unknown),
        span: caps.get(0)?.range(),
    })
}

/// Classify `rest` and cut the message out of it.
///
/// The message is whatever follows the level token, with leading `:`, `,`,
/// `-` and whitespace removed. Without a token the level defaults to INFO so
/// the entry stays visible, and the whole remainder is the message.
pub fn split_level(rest: &str) -> (LogLevel, &str) {
    let (level, tail) = match classify(rest) {
        Some(found) => (found.level, &rest[found.span.end..]),
        None => (LogLevel::Info, rest),
    };
    let message =
        tail.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | ',' | '-'));
    (level, message)
}
