//! Byte encoding of multiplexer output for HTTP response bodies.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use std::pin::Pin;

use crate::error::Result;
use crate::orchestrator::OutputStream;

/// Byte stream suitable for a streaming HTTP response.
pub type OutputByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Response header telling channel-encoded stream readers to expect data lines.
pub const STREAM_DATA_HEADER: (&str, &str) = ("X-Experimental-Stream-Data", "true");

/// Encode formatted output lines as bytes.
///
/// Empty lines are treated as "no output" and are skipped.
pub fn encode_output_as_bytes(stream: OutputStream) -> OutputByteStream {
    Box::pin(stream.filter_map(|item| async move {
        match item {
            Ok(line) if line.is_empty() => None,
            Ok(line) => Some(Ok(Bytes::from(line))),
            Err(e) => Some(Err(e)),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[tokio::test]
    async fn empty_lines_are_skipped() {
        let lines: OutputStream = Box::pin(stream::iter(vec![
            Ok("0:\"a\"\n".to_string()),
            Ok(String::new()),
            Ok("2:[1]\n".to_string()),
        ]));
        let chunks: Vec<Bytes> = encode_output_as_bytes(lines)
            .map(|b| b.unwrap())
            .collect()
            .await;
        assert_eq!(
            chunks,
            vec![Bytes::from_static(b"0:\"a\"\n"), Bytes::from_static(b"2:[1]\n")]
        );
    }
}
