//! logsift-core — log normalization and temporal indexing.
//!
//! Turns heterogeneous, loosely structured log text into a uniform sequence
//! of [`LogEntry`] values, buckets them on a time grid and compiles user
//! queries for filtering and highlighting.
//!
//! # Architecture
//!
//! ```text
//!             ┌──► timestamp ──┐
//! text ──► assembler           ├──► entries ──► filter ──► export
//!             └──► dialect ────┘       │           ▲
//!                    │                 └─► timeline │
//!                    └──► level               search ┘
//! ```
//!
//! Everything here is synchronous and pure: the same input text and options
//! always produce the same entries.

pub mod assembler;
pub mod config;
pub mod dialect;
pub mod export;
pub mod filter;
pub mod level;
pub mod search;
pub mod timeline;
pub mod timestamp;
pub mod types;

pub use assembler::{parse_log, parse_log_with, ParseOptions};
pub use filter::{Bookmarks, Filters};
pub use search::{compile, Matcher, Search};
pub use timeline::{bucket, BucketWidth};
pub use timestamp::NaiveZone;
pub use types::{ChunkBin, LogEntry, LogLevel, TimeRange};
