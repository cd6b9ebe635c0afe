//! logsift — log normalization, timeline bucketing and search.
//!
//! This crate is a facade over the workspace so that integration tests,
//! benches and the `logsift` binary import one path.
//!
//! # Architecture
//!
//! ```text
//! Feed ──► decode ──► assembler ──► Filters ──► render / export
//!                         │
//!                         └──► timeline
//! ```
//!
//! [`feeds`] does the I/O; [`core`] is pure and synchronous.

pub mod render;

pub use logsift_core as core;
pub use logsift_feeds as feeds;

pub use logsift_core::{
    bucket, compile, parse_log, parse_log_with, BucketWidth, Bookmarks, ChunkBin, Filters,
    LogEntry, LogLevel, Matcher, NaiveZone, ParseOptions, Search, TimeRange,
};
