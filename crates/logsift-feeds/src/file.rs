//! File feed: reads a log file in one shot.

use crate::{read_source, FeedError};
use std::path::Path;

pub async fn read_file(path: &Path) -> Result<Vec<u8>, FeedError> {
    let name = path.display().to_string();
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| FeedError::Io {
            name: name.clone(),
            source,
        })?;
    read_source(file, &name).await
}
