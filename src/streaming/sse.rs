//! SSE decoding
//!
//! Turns a chat-completions byte stream into a [`FragmentStream`]. SSE framing,
//! line buffering and UTF-8 boundaries are handled by `eventsource-stream`;
//! this module only maps each `data:` payload to a [`Fragment`].

use std::fmt;

use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};

use crate::error::{Result, ToolStreamError};
use crate::orchestrator::FragmentStream;
use crate::types::Fragment;

/// Terminal sentinel sent by chat-completions endpoints.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Decode one SSE `data:` payload.
///
/// Returns `None` for the `[DONE]` sentinel and for keep-alive blanks.
pub fn parse_fragment(data: &str) -> Result<Option<Fragment>> {
    let data = data.trim();
    if data.is_empty() || data == DONE_SENTINEL {
        return Ok(None);
    }
    serde_json::from_str(data)
        .map(Some)
        .map_err(|e| ToolStreamError::StreamError(format!("invalid fragment payload: {e}")))
}

/// Decode an SSE byte stream into fragments.
///
/// Transport and framing errors surface as [`ToolStreamError::StreamError`].
pub fn fragment_stream_from_sse<S, B, E>(bytes: S) -> FragmentStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let fragments = bytes
        .eventsource()
        .filter_map(|event| async move {
            match event {
                Ok(event) => parse_fragment(&event.data).transpose(),
                Err(e) => Some(Err(ToolStreamError::StreamError(format!(
                    "SSE parsing error: {e}"
                )))),
            }
        });
    Box::pin(fragments)
}
