//! Static log corpora used across harnesses.
//!
//! [`LINE_CASES`] pairs one representative line per timestamp grammar and
//! dialect with the entry it must produce when naive stamps are read as UTC.
//! The multi-line corpora exercise continuation merging and the base-date
//! pre-scan.

use logsift::LogLevel;
use std::path::{Path, PathBuf};

/// 2025-08-13T00:00:00Z in epoch milliseconds.
pub const AUG_13_2025_MS: i64 = 1_755_043_200_000;

const HOUR_MS: i64 = 3_600_000;

/// One input line and the head it must parse to.
#[derive(Debug, Clone, Copy)]
pub struct LineCase {
    pub name: &'static str,
    pub line: &'static str,
    pub time_ms: Option<i64>,
    pub time_raw: &'static str,
    pub level: LogLevel,
    pub source: &'static str,
    pub message: &'static str,
}

/// One line per grammar and dialect.
pub const LINE_CASES: &[LineCase] = &[
    LineCase {
        name: "dashed space with comma fraction",
        line: "2025-08-13 10:00:00,123 ERROR Failed to connect",
        time_ms: Some(AUG_13_2025_MS + 10 * HOUR_MS + 123),
        time_raw: "2025-08-13 10:00:00,123",
        level: LogLevel::Error,
        source: "",
        message: "Failed to connect",
    },
    LineCase {
        name: "rfc3339 with offset",
        line: "2025-08-13T10:00:01.5+02:00 [WARN] cache: miss",
        time_ms: Some(AUG_13_2025_MS + 8 * HOUR_MS + 1_500),
        time_raw: "2025-08-13T10:00:01.5+02:00",
        level: LogLevel::Warn,
        source: "",
        message: "cache: miss",
    },
    LineCase {
        name: "slashed ymd",
        line: "2025/08/13 10:00:02 DEBUG pool warmed",
        time_ms: Some(AUG_13_2025_MS + 10 * HOUR_MS + 2_000),
        time_raw: "2025/08/13 10:00:02",
        level: LogLevel::Debug,
        source: "",
        message: "pool warmed",
    },
    LineCase {
        name: "colon millis",
        line: "2025-08-13 10:00:03:045 INFO colon millis",
        time_ms: Some(AUG_13_2025_MS + 10 * HOUR_MS + 3_045),
        time_raw: "2025-08-13 10:00:03:045",
        level: LogLevel::Info,
        source: "",
        message: "colon millis",
    },
    LineCase {
        name: "ambiguous slash with meridiem",
        line: "13/08/2025 10:00:04 PM WARN late",
        time_ms: Some(AUG_13_2025_MS + 22 * HOUR_MS + 4_000),
        time_raw: "13/08/2025 10:00:04 PM",
        level: LogLevel::Warn,
        source: "",
        message: "late",
    },
    LineCase {
        name: "day month name",
        line: "13 Aug 2025 10:00:05.250 ERROR name month",
        time_ms: Some(AUG_13_2025_MS + 10 * HOUR_MS + 5_250),
        time_raw: "13 Aug 2025 10:00:05.250",
        level: LogLevel::Error,
        source: "",
        message: "name month",
    },
    LineCase {
        name: "prefixed day month name with symbol level",
        line: "611:M 13 Aug 2025 10:00:06.001 * Ready to accept connections",
        time_ms: Some(AUG_13_2025_MS + 10 * HOUR_MS + 6_001),
        time_raw: "13 Aug 2025 10:00:06.001",
        level: LogLevel::Info,
        source: "",
        message: "Ready to accept connections",
    },
    LineCase {
        name: "bare combined-log stamp",
        line: "13/Aug/2025:10:00:07 +1000 something",
        time_ms: Some(AUG_13_2025_MS + 7_000),
        time_raw: "13/Aug/2025:10:00:07 +1000",
        level: LogLevel::Info,
        source: "",
        message: "something",
    },
    LineCase {
        name: "bracketed level",
        line: "resque-scheduler: [INFO] 2025-08-13T10:00:08+10:00: Starting",
        time_ms: Some(AUG_13_2025_MS + 8_000),
        time_raw: "2025-08-13T10:00:08+10:00",
        level: LogLevel::Info,
        source: "resque-scheduler",
        message: "Starting",
    },
    LineCase {
        name: "installer with full stamp",
        line: "MSI (s) (A4:B8) [2025-08-13 10:00:09:100]: Product: Widget",
        time_ms: Some(AUG_13_2025_MS + 10 * HOUR_MS + 9_100),
        time_raw: "2025-08-13 10:00:09:100",
        level: LogLevel::Info,
        source: "MSI (s) A4:B8",
        message: "Product: Widget",
    },
    LineCase {
        name: "combined web log",
        line: r#"10.0.0.7 - - [13/Aug/2025:10:00:10 +0000] "GET /a HTTP/1.1" 404 5 "-" "curl/8.0""#,
        time_ms: Some(AUG_13_2025_MS + 10 * HOUR_MS + 10_000),
        time_raw: "13/Aug/2025:10:00:10 +0000",
        level: LogLevel::Warn,
        source: "10.0.0.7",
        message: "GET /a HTTP/1.1 404 5 curl/8.0",
    },
    LineCase {
        name: "runtime logger",
        line: "App 7 output: E, [2025-08-13T10:00:11.250000 #7] ERROR -- : boom",
        time_ms: Some(AUG_13_2025_MS + 10 * HOUR_MS + 11_250),
        time_raw: "2025-08-13T10:00:11.250000",
        level: LogLevel::Error,
        source: "App 7 output",
        message: "boom",
    },
    LineCase {
        name: "structured json",
        line: r#"{"t":{"$date":"2025-08-13T10:00:12.000Z"},"s":"I","c":"NETWORK","ctx":"conn1","msg":"Connection ended"}"#,
        time_ms: Some(AUG_13_2025_MS + 10 * HOUR_MS + 12_000),
        time_raw: "2025-08-13T10:00:12.000Z",
        level: LogLevel::Info,
        source: "NETWORK conn1",
        message: "Connection ended",
    },
];

/// A Java-style application log with a stack trace and a banner line.
pub const STACK_TRACE_LOG: &str = "\
=== service boot ===
2025-08-13 10:00:00 INFO Starting application version 2.4.1
2025-08-13 10:00:01 ERROR Unhandled exception
java.lang.IllegalStateException: pool closed
    at com.example.Pool.get(Pool.java:42)
    at com.example.App.run(App.java:7)

2025-08-13 10:00:02 WARN Retrying in 5s
";

/// An installer log whose time-only stamps precede the only dated line.
pub const INSTALLER_LOG: &str = "\
MSI (c) (1C:50) [10:00:00:100]: Resetting cached policy values
MSI (c) (1C:50) [10:00:00:250]: Machine policy value 'Debug' is 0
  ******* RunEngine:
=== Verbose logging started: 13/08/2025  10:00:00  Build type: SHIP UNICODE ===
=== Logging started: 13/08/2025 10:00:00 ===
MSI (s) (A4:B8) [10:00:01:003]: Product: Widget -- Installation completed successfully.
";

/// Every [`LINE_CASES`] line, newline-joined.
pub fn mixed_dialect_log() -> String {
    LINE_CASES.iter().map(|c| c.line).collect::<Vec<_>>().join("\n")
}

/// `n` lines cycling through the dialects, one second apart, with a
/// continuation line after every tenth entry.
pub fn corpus_high_volume(n: usize) -> String {
    let mut out = String::new();
    for i in 0..n {
        let (mi, s) = ((i / 60) % 60, i % 60);
        let line = match i % 5 {
            0 => format!("2025-08-13 10:{mi:02}:{s:02}.{:03} ERROR request {i} failed", i % 1000),
            1 => format!("2025-08-13T10:{mi:02}:{s:02}Z [WARN] slow request {i}"),
            2 => format!(
                r#"10.0.0.{} - - [13/Aug/2025:10:{mi:02}:{s:02} +0000] "GET /item/{i} HTTP/1.1" 200 512 "-" "bench""#,
                i % 255
            ),
            3 => format!("W, [2025-08-13T10:{mi:02}:{s:02}.000001 #42]  WARN -- app: retry {i}"),
            _ => format!(
                r#"{{"t":{{"$date":"2025-08-13T10:{mi:02}:{s:02}.000Z"}},"s":"I","c":"NET","msg":"conn {i}"}}"#
            ),
        };
        out.push_str(&line);
        out.push('\n');
        if i % 10 == 0 {
            out.push_str("    at com.example.Handler.handle(Handler.java:99)\n");
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Fixture files
// ---------------------------------------------------------------------------

/// Write `bytes` to `dir/name` and return the path.
pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write fixture");
    path
}

/// `text` as UTF-16LE, optionally preceded by a byte-order mark.
pub fn utf16le_bytes(text: &str, bom: bool) -> Vec<u8> {
    let mut bytes = if bom { vec![0xFF, 0xFE] } else { Vec::new() };
    bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
    bytes
}
