//! logsift-feeds — text sources for logsift.
//!
//! A [`Feed`] names where log text comes from. Loading reads the whole source
//! and decodes it (see [`decode`]); parsing is left to `logsift-core`.

pub mod decode;
pub mod file;
pub mod stdin;

use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Failure to read a source.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Where log text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    File(PathBuf),
    Stdin,
}

impl Feed {
    /// `None` or `-` selects stdin; anything else is a file path.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None | Some("-") => Feed::Stdin,
            Some(path) => Feed::File(PathBuf::from(path)),
        }
    }

    /// Read and decode the whole source.
    pub async fn load(&self) -> Result<SourceText, FeedError> {
        let bytes = match self {
            Feed::File(path) => file::read_file(path).await?,
            Feed::Stdin => stdin::read_stdin().await?,
        };
        let text = decode::decode(&bytes);
        tracing::debug!(source = %self, bytes = bytes.len(), chars = text.len(), "feed: loaded");
        Ok(SourceText {
            name: self.to_string(),
            text,
        })
    }
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feed::File(path) => write!(f, "{}", path.display()),
            Feed::Stdin => write!(f, "<stdin>"),
        }
    }
}

/// Decoded text of one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    /// Display name: the file path or `<stdin>`.
    pub name: String,
    pub text: String,
}

/// Drain `reader` to its end.
pub async fn read_source<R>(mut reader: R, name: &str) -> Result<Vec<u8>, FeedError>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .await
        .map_err(|source| FeedError::Io {
            name: name.to_string(),
            source,
        })?;
    Ok(bytes)
}
