use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use logsift::core::config::Config;
use logsift::core::timeline::bin_count;
use logsift::feeds::Feed;
use logsift::render::{self, OutputFormat, View};
use logsift::{Bookmarks, BucketWidth, Filters, LogLevel, NaiveZone, ParseOptions, TimeRange};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;

/// Refuse to print timelines longer than this; every bin is allocated.
const MAX_TIMELINE_BINS: u64 = 1_000_000;

#[derive(Parser)]
#[command(name = "logsift", about = "logsift — normalize, bucket and search log files")]
struct Cli {
    /// Log file to read. Reads stdin when absent or `-`.
    file: Option<String>,

    /// Keep entries matching this text (or regex with --regex).
    #[arg(short, long)]
    query: Option<String>,

    /// Treat --query as a regular expression.
    #[arg(short, long)]
    regex: bool,

    /// Show only these levels (repeatable). Defaults to all but UNKNOWN.
    #[arg(short, long = "level", value_name = "LEVEL")]
    levels: Vec<LogLevel>,

    /// Timeline bucket width, e.g. 250ms, 5s, 1m, 1h.
    #[arg(short, long)]
    bucket: Option<BucketWidth>,

    /// Keep entries at or after this RFC 3339 instant.
    #[arg(long)]
    since: Option<DateTime<Utc>>,

    /// Keep entries before this RFC 3339 instant.
    #[arg(long)]
    until: Option<DateTime<Utc>>,

    /// Zone for timestamps without an offset: local, utc or ±HH:MM.
    #[arg(long)]
    zone: Option<NaiveZone>,

    /// Bookmark an entry by index (repeatable); used by csv and markdown.
    #[arg(long = "bookmark", value_name = "INDEX")]
    bookmarks: Vec<usize>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Entries)]
    format: OutputFormat,

    /// Never mark search matches, even on a terminal.
    #[arg(long)]
    no_highlight: bool,

    /// Config file to use instead of ~/.config/logsift/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write debug logs to logsift-debug.log in the temp directory.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let path = std::env::temp_dir().join("logsift-debug.log");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening debug log {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!(path = %path.display(), "logsift debug log started");
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load().context("loading config")?,
    };

    let feed = Feed::from_arg(cli.file.as_deref());
    let source = feed.load().await?;

    let options = ParseOptions {
        naive_zone: cli.zone.unwrap_or(config.parse.naive_zone),
    };
    let entries = logsift::parse_log_with(&source.text, &options);

    let mut filters = Filters {
        query: cli.query.clone().unwrap_or_default(),
        regex: cli.regex || config.search.regex,
        ..Filters::default()
    };
    if !cli.levels.is_empty() {
        filters.levels = cli.levels.iter().copied().collect();
    }
    if cli.since.is_some() || cli.until.is_some() {
        filters.time_range = Some(TimeRange::new(
            cli.since.unwrap_or(DateTime::<Utc>::MIN_UTC),
            cli.until.unwrap_or(DateTime::<Utc>::MAX_UTC),
        ));
    }

    let search = filters.search();
    let rows = filters.apply_with(&search, &entries);
    let bookmarks: Bookmarks = cli.bookmarks.iter().copied().collect();
    let bookmarked = bookmarks.select(&entries);

    let width = cli.bucket.unwrap_or(config.timeline.bucket);
    let bins = match cli.format {
        OutputFormat::Timeline => {
            let count = bin_count(&entries, width.as_millis());
            if count > MAX_TIMELINE_BINS {
                anyhow::bail!(
                    "timeline would need {count} bins at width {width} \
                     (limit {MAX_TIMELINE_BINS}); pass a wider --bucket"
                );
            }
            logsift::bucket(&entries, width.as_millis())
        }
        _ => Vec::new(),
    };

    let mut stdout = std::io::stdout().lock();
    let highlight = !cli.no_highlight && config.search.highlight && stdout.is_terminal();
    let view = View {
        rows: &rows,
        bookmarked: &bookmarked,
        bins: &bins,
        filters: &filters,
        search: &search,
        highlight,
        top_messages: config.export.top_messages,
    };
    let output = render::render(cli.format, &view)?;

    tracing::debug!(
        source = %source.name,
        entries = entries.len(),
        rows = rows.len(),
        format = ?cli.format,
        "logsift: rendering"
    );
    stdout.write_all(output.as_bytes())?;
    if !output.is_empty() && !output.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
