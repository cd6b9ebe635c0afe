//! Stdin feed: reads piped input until EOF.

use crate::{read_source, FeedError};

pub async fn read_stdin() -> Result<Vec<u8>, FeedError> {
    read_source(tokio::io::stdin(), "<stdin>").await
}
