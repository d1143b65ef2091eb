//! Bulk decoding for callers that want every row at once

use super::row::Row;
use super::streamer::RowStreamer;
use std::io::Cursor;
use tokio::io::AsyncRead;

/// Batch size used when draining a whole source
pub const BULK_BATCH_SIZE: usize = 50;

/// Decode `source` to completion and return every row in order
pub async fn parse_all<R>(source: R) -> Vec<Row>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let mut streamer = RowStreamer::spawn(source, BULK_BATCH_SIZE);
    let mut rows = Vec::new();

    loop {
        let batch = streamer.request_more().await;
        rows.extend(batch.rows);
        if !batch.has_more {
            break;
        }
    }

    streamer.close().await;
    rows
}

/// Decode an in-memory copy of raw log output
pub async fn parse_bytes(bytes: impl Into<Vec<u8>>) -> Vec<Row> {
    parse_all(Cursor::new(bytes.into())).await
}

/// Synchronous variant of [`parse_bytes`] for code outside a tokio runtime.
///
/// Returns `None` if the runtime backing the decoder cannot be created.
pub fn parse_all_blocking(bytes: impl Into<Vec<u8>>) -> Option<Vec<Row>> {
    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::warn!("Failed to start decoder runtime: {}", e);
            return None;
        }
    };
    Some(runtime.block_on(parse_bytes(bytes)))
}
