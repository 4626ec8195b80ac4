use async_stream::try_stream;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use std::io;
use tokio::io::AsyncBufReadExt;
use tokio_util::io::StreamReader;

use crate::error::Result;

/// Splits a response body into lines as its bytes arrive.
///
/// Blank lines are event separators (or heartbeats) and are skipped. Only
/// the line currently being assembled is buffered, and the stream ends
/// when the body does.
pub fn decode_lines<S, E>(body: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    let reader = StreamReader::new(Box::pin(body.map_err(io::Error::other)));
    try_stream! {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.is_empty() {
                continue;
            }
            yield line;
        }
    }
}
