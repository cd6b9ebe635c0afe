//! Whole-line recognizers for log dialects that do not open with a bare
//! timestamp.
//!
//! Each recognizer is a pure `fn(&str, &LineContext) -> Option<ParsedHead>`
//! that either produces a complete head (time, level, source, message) or
//! declines. A recognizer that almost matches but misses a required field
//! declines silently; the assembler then tries the next one.

use crate::level::{level_from_letter, level_from_token};
use crate::timestamp::{parse_any, parse_iso, Grammar, NaiveZone};
use crate::types::LogLevel;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

// ---------------------------------------------------------------------------
// Shared shapes
// ---------------------------------------------------------------------------

/// Which grammar produced a [`ParsedHead`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// A line opening with one of the timestamp grammars.
    Timestamped,
    /// `<source>: [<LEVEL>] <ISO-8601>: <message>` (Resque and friends).
    BracketedLevel,
    /// Windows Installer verbose logs.
    Installer,
    /// Apache/Nginx combined access logs.
    CombinedWeb,
    /// Ruby `Logger` lines, optionally behind a `<prefix>: ` tag.
    RuntimeLogger,
    /// MongoDB-style structured JSON lines.
    StructuredJson,
}

/// Everything a line contributes when it starts a new entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedHead {
    pub dialect: Dialect,
    pub time: Option<DateTime<Utc>>,
    pub time_raw: String,
    pub level: LogLevel,
    pub source: String,
    pub message: String,
}

/// Per-input state the recognizers may consult. Fixed before the main pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineContext {
    /// Date used to complete time-only installer stamps.
    pub base_date: Option<NaiveDate>,
    pub zone: NaiveZone,
}

pub type Recognizer = fn(&str, &LineContext) -> Option<ParsedHead>;

/// Recognizers in the order they are tried.
pub const RECOGNIZERS: [Recognizer; 5] = [
    bracketed_level,
    installer,
    combined_web,
    runtime_logger,
    structured_json,
];

/// Run the recognizers in order; the first to accept wins.
pub fn recognize(line: &str, ctx: &LineContext) -> Option<ParsedHead> {
    RECOGNIZERS.iter().find_map(|recognizer| recognizer(line, ctx))
}

// ---------------------------------------------------------------------------
// Bracketed level
// ---------------------------------------------------------------------------

static BRACKETED_LEVEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<source>\S+):\s+\[(?P<level>ERROR|ERR|WARN|WARNING|INFO|DEBUG|TRACE)\]\s+",
        r"(?P<ts>[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(?:[.,][0-9]+)?(?:Z|[+-][0-9]{2}:[0-9]{2})):",
        r"\s*(?P<msg>.*)$"
    ))
    .expect("bracketed-level pattern must compile")
});

/// `resque-scheduler: [INFO] 2025-08-13T00:00:22+10:00: Starting`
pub fn bracketed_level(line: &str, ctx: &LineContext) -> Option<ParsedHead> {
    let caps = BRACKETED_LEVEL_RE.captures(line)?;
    let ts = &caps["ts"];
    Some(ParsedHead {
        dialect: Dialect::BracketedLevel,
        time: Grammar::Rfc3339.parse(ts, ctx.zone),
        time_raw: ts.to_string(),
        level: level_from_token(&caps["level"]).unwrap_or(LogLevel::Info),
        source: caps["source"].to_string(),
        message: caps["msg"].to_string(),
    })
}

// ---------------------------------------------------------------------------
// Installer
// ---------------------------------------------------------------------------

static INSTALLER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^MSI\s+\((?P<mode>[a-z])\)\s+\((?P<thread>[0-9a-f:]+)\)\s+\[(?P<stamp>[^\]]+)\]:\s*(?P<msg>.*)$",
    )
    .expect("installer pattern must compile")
});

static INSTALLER_DATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4}-[0-9]{2}-[0-9]{2})\s+([0-9]{2}:[0-9]{2}:[0-9]{2}:[0-9]{1,3})$")
        .expect("installer date pattern must compile")
});

static INSTALLER_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{2}):([0-9]{2}):([0-9]{2}):([0-9]{1,3})$")
        .expect("installer time pattern must compile")
});

/// `MSI (c) (1C:50) [12:16:41:491]: Note: 1: 2205`
///
/// Time-only stamps are completed with the input's base date; without one
/// the entry keeps its stamp text and no instant.
pub fn installer(line: &str, ctx: &LineContext) -> Option<ParsedHead> {
    let caps = INSTALLER_RE.captures(line)?;
    let stamp = caps["stamp"].trim();

    let time = if let Some(dated) = INSTALLER_DATED_RE.captures(stamp) {
        Grammar::ColonMillis.parse(&format!("{} {}", &dated[1], &dated[2]), ctx.zone)
    } else if let Some(clock) = INSTALLER_TIME_RE.captures(stamp) {
        let num = |i: usize| clock[i].parse::<u32>().ok();
        let millis = crate::timestamp::fraction_millis(&clock[4]);
        ctx.base_date
            .and_then(|date| date.and_hms_milli_opt(num(1)?, num(2)?, num(3)?, millis))
            .and_then(|naive| ctx.zone.resolve(naive))
    } else {
        None
    };

    Some(ParsedHead {
        dialect: Dialect::Installer,
        time,
        time_raw: stamp.to_string(),
        level: LogLevel::Info,
        source: format!("MSI ({}) {}", &caps["mode"], &caps["thread"]),
        message: caps["msg"].to_string(),
    })
}

// ---------------------------------------------------------------------------
// Combined web log
// ---------------------------------------------------------------------------

static COMBINED_WEB_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<client>\S+)\s+\S+\s+\S+\s+",
        r"\[(?P<ts>[0-9]{2}/[A-Za-z]{3}/[0-9]{4}:[0-9]{2}:[0-9]{2}:[0-9]{2}\s+[+-][0-9]{4})\]\s+",
        r#""(?P<request>[^"]*)"\s+(?P<status>[0-9]{3})\s+(?P<size>\S+)\s+"#,
        r#""(?P<referrer>[^"]*)"\s+"(?P<agent>[^"]*)""#
    ))
    .expect("combined web-log pattern must compile")
});

/// HTTP status → severity: 5xx errors, 4xx warnings, everything else info.
pub fn level_from_status(status: u16) -> LogLevel {
    if status >= 500 {
        LogLevel::Error
    } else if status >= 400 {
        LogLevel::Warn
    } else {
        LogLevel::Info
    }
}

/// `127.0.0.1 - - [13/Aug/2025:00:00:23 +1000] "HEAD / HTTP/1.1" 200 0 "-" "curl/8.0"`
pub fn combined_web(line: &str, ctx: &LineContext) -> Option<ParsedHead> {
    let caps = COMBINED_WEB_RE.captures(line)?;
    let status: u16 = caps["status"].parse().ok()?;
    let ts = &caps["ts"];

    let referrer = &caps["referrer"];
    let parts = [
        &caps["request"],
        &caps["status"],
        &caps["size"],
        if referrer == "-" { "" } else { referrer },
        &caps["agent"],
    ];
    let message = parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    Some(ParsedHead {
        dialect: Dialect::CombinedWeb,
        time: Grammar::CombinedLog.parse(ts, ctx.zone),
        time_raw: ts.to_string(),
        level: level_from_status(status),
        source: caps["client"].to_string(),
        message,
    })
}

// ---------------------------------------------------------------------------
// Runtime logger
// ---------------------------------------------------------------------------

static RUNTIME_LOGGER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?:(?P<prefix>[^\[]+?):\s+)?(?P<letter>[DIWEF]),\s+",
        r"\[(?P<ts>[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(?:[.,][0-9]+)?(?:Z|[+-][0-9]{2}:[0-9]{2})?)",
        r"(?:\s+#[0-9]+)?\s*\]\s*",
        r"(?:(?P<word>[A-Z]+)\s+--\s*(?P<prog>[^:\s]*)\s*:\s*)?",
        r"(?P<msg>.*)$"
    ))
    .expect("runtime-logger pattern must compile")
});

/// `App 611 output: W, [2025-08-13T00:00:02.705332 #611]  WARN -- : slow`
///
/// An explicit level word overrides the letter code.
pub fn runtime_logger(line: &str, ctx: &LineContext) -> Option<ParsedHead> {
    let caps = RUNTIME_LOGGER_RE.captures(line)?;
    let ts = &caps["ts"];
    let letter = caps["letter"].chars().next()?;
    let level = caps
        .name("word")
        .and_then(|word| level_from_token(word.as_str()))
        .or_else(|| level_from_letter(letter))
        .unwrap_or(LogLevel::Info);

    let prefix = caps.name("prefix").map_or("", |m| m.as_str().trim());
    let source = if prefix.is_empty() {
        caps.name("prog").map_or("", |m| m.as_str())
    } else {
        prefix
    };

    Some(ParsedHead {
        dialect: Dialect::RuntimeLogger,
        time: parse_iso(ts, ctx.zone),
        time_raw: ts.to_string(),
        level,
        source: source.to_string(),
        message: caps["msg"].to_string(),
    })
}

// ---------------------------------------------------------------------------
// Structured JSON
// ---------------------------------------------------------------------------

/// `{"t":{"$date":"2025-08-13T00:00:02.705+10:00"},"s":"I","c":"NETWORK","ctx":"conn1","msg":"Connection ended"}`
///
/// Requires a timestamp (`t` or `t.$date`) and a message, each present and
/// not null, false, zero or empty. A timestamp that is neither a string, a
/// millisecond number nor a `$numberLong` wrapper keeps its JSON text with
/// no instant.
pub fn structured_json(line: &str, ctx: &LineContext) -> Option<ParsedHead> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with('{') {
        return None;
    }
    let value: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(err) => {
            tracing::trace!(error = %err, "structured json: not a json object");
            return None;
        }
    };
    let obj = value.as_object()?;

    let stamp = obj
        .get("t")
        .and_then(|t| t.get("$date"))
        .filter(|date| truthy(date))
        .or_else(|| obj.get("t").filter(|t| truthy(t)))?;
    let (time_raw, time) = json_time(stamp, ctx);

    let message = match obj.get("msg").filter(|msg| truthy(msg))? {
        Value::String(msg) => msg.clone(),
        other => other.to_string(),
    };

    let level = obj
        .get("s")
        .and_then(Value::as_str)
        .and_then(severity_code)
        .unwrap_or(LogLevel::Info);

    let source = ["c", "ctx"]
        .iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let message = match obj.get("attr") {
        Some(attr) if !attr.is_null() => format!("{message} {attr}"),
        _ => message,
    };

    Some(ParsedHead {
        dialect: Dialect::StructuredJson,
        time,
        time_raw,
        level,
        source,
        message,
    })
}

/// JSON truthiness: null, false, zero and the empty string are absent.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn json_time(stamp: &Value, ctx: &LineContext) -> (String, Option<DateTime<Utc>>) {
    match stamp {
        Value::String(ts) => (ts.clone(), parse_any(ts, ctx.zone)),
        Value::Number(n) => (n.to_string(), n.as_i64().and_then(DateTime::from_timestamp_millis)),
        Value::Object(wrapper) => match wrapper.get("$numberLong").and_then(Value::as_str) {
            Some(ms) => (
                ms.to_string(),
                ms.trim().parse().ok().and_then(DateTime::from_timestamp_millis),
            ),
            None => (stamp.to_string(), None),
        },
        other => (other.to_string(), None),
    }
}

/// `F`, `E`, `W`, `I`, `D`, `T`, and the verbose debug codes `D1`..`D5`.
fn severity_code(code: &str) -> Option<LogLevel> {
    let mut chars = code.chars();
    let letter = chars.next()?;
    let tail = chars.as_str();
    if tail.is_empty() {
        level_from_letter(letter)
    } else if letter == 'D' && matches!(tail, "1" | "2" | "3" | "4" | "5") {
        Some(LogLevel::Debug)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
