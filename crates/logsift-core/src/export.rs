//! CSV and Markdown summary export of a filtered view.

use crate::filter::Filters;
use crate::types::{LogEntry, LogLevel};
use chrono::SecondsFormat;
use std::collections::HashMap;

const CSV_HEADER: &str = "Time,Level,Message";

/// Default number of messages listed under "Top N Messages".
pub const DEFAULT_TOP_MESSAGES: usize = 10;

/// RFC 3339 UTC with milliseconds when the entry has an instant, otherwise
/// the raw timestamp text.
pub fn time_label(entry: &LogEntry) -> String {
    match entry.time {
        Some(t) => t.to_rfc3339_opts(SecondsFormat::Millis, true),
        None => entry.time_raw.clone(),
    }
}

fn csv_escape(value: &str) -> String {
    let value = value.replace("\r\n", "\n").replace('\r', "\n");
    if value.contains(['"', ',', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value
    }
}

fn csv_row(entry: &LogEntry) -> String {
    [time_label(entry), entry.level.to_string(), entry.message.clone()]
        .iter()
        .map(|col| csv_escape(col))
        .collect::<Vec<_>>()
        .join(",")
}

/// Rows as CSV, followed by a `Bookmarked Lines` section when `bookmarked`
/// is non-empty.
pub fn to_csv(rows: &[&LogEntry], bookmarked: &[&LogEntry]) -> String {
    let mut lines = vec![CSV_HEADER.to_string()];
    lines.extend(rows.iter().map(|r| csv_row(r)));
    if !bookmarked.is_empty() {
        lines.push(String::new());
        lines.push("Bookmarked Lines".to_string());
        lines.push(CSV_HEADER.to_string());
        lines.extend(bookmarked.iter().map(|r| csv_row(r)));
    }
    lines.join("\n")
}

fn sanitize_md(s: &str) -> String {
    s.replace('`', "\\`").replace('|', "\\|")
}

/// Most frequent non-empty messages, ties kept in first-seen order.
fn top_messages<'a>(rows: &[&'a LogEntry], limit: usize) -> Vec<(&'a str, usize)> {
    let mut order: Vec<&'a str> = Vec::new();
    let mut counts: HashMap<&'a str, usize> = HashMap::new();
    for row in rows.iter().filter(|r| !r.message.is_empty()) {
        let count = counts.entry(row.message.as_str()).or_insert_with(|| {
            order.push(row.message.as_str());
            0
        });
        *count += 1;
    }
    let mut ranked: Vec<(&str, usize)> = order.into_iter().map(|m| (m, counts[m])).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

/// A Markdown report of `rows`: totals, active filters, per-level counts,
/// the `top` most frequent messages and any bookmarked lines.
pub fn markdown_summary(
    rows: &[&LogEntry],
    filters: &Filters,
    bookmarked: &[&LogEntry],
    top: usize,
) -> String {
    let mut level_counts: HashMap<LogLevel, usize> = HashMap::new();
    for row in rows {
        *level_counts.entry(row.level).or_insert(0) += 1;
    }

    let active_levels = filters
        .levels
        .iter()
        .map(LogLevel::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let search = match (filters.query.is_empty(), filters.regex) {
        (true, _) => "none".to_string(),
        (false, true) => format!("regex: {}", filters.query),
        (false, false) => format!("text: {}", filters.query),
    };
    let time_filter = match &filters.time_range {
        Some(range) => format!(
            "{} → {}",
            range.start.to_rfc3339_opts(SecondsFormat::Millis, true),
            range.end.to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
        None => "none".to_string(),
    };

    let mut lines = vec![
        "# Log Summary".to_string(),
        String::new(),
        format!("- Total rows: {}", rows.len()),
        format!(
            "- Active levels: {}",
            if active_levels.is_empty() { "none" } else { &active_levels }
        ),
        format!("- Search: {search}"),
        format!("- Time filter: {time_filter}"),
        String::new(),
        "## Counts by Level".to_string(),
    ];

    let before = lines.len();
    for level in LogLevel::ALL {
        match level_counts.get(&level) {
            Some(count) if *count > 0 => lines.push(format!("- {level}: {count}")),
            _ => {}
        }
    }
    if lines.len() == before {
        lines.push("- none".to_string());
    }
    lines.push(String::new());

    lines.push(format!("## Top {top} Messages"));
    let top_messages = top_messages(rows, top);
    if top_messages.is_empty() {
        lines.push("- none".to_string());
    } else {
        for (message, count) in top_messages {
            lines.push(format!("- {count} × {}", sanitize_md(message)));
        }
    }
    lines.push(String::new());

    if !bookmarked.is_empty() {
        lines.push("## Bookmarked Lines".to_string());
        for row in bookmarked {
            lines.push(format!(
                "- {} • {} • {}",
                time_label(row),
                row.level,
                sanitize_md(&row.message)
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}
