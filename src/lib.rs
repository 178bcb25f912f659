//! # Siumai Toolstream
//!
//! Tool-call aware multiplexing of streamed chat completions.
//!
//! A completion stream mixes text deltas with partial tool calls. This crate
//! forwards the text as it arrives, reassembles the tool calls, hands each
//! finished batch to your tool layer and splices whatever the tool layer
//! yields back into the same output: data payloads, and continuation streams
//! (the model's next turn) which are multiplexed recursively.
//!
//! - [`orchestrator::tool_stream`] - async sources and callbacks
//! - [`orchestrator::blocking_tool_stream`] - iterators, for blocking transports
//! - [`streaming::fragment_stream_from_sse`] - decode a chat-completions SSE body
//! - [`format::OutputFormat`] - channel-encoded (`0:"text"\n`, `2:[...]\n`) or human-readable output
//!
//! ## Example
//!
//! ```rust,ignore
//! use siumai_toolstream::prelude::*;
//!
//! let options = ToolStreamOptions::builder()
//!     .on_execute_tool_calls(move |calls| -> YieldStream {
//!         Box::pin(async_stream::try_stream! {
//!             yield CallbackYield::event(serde_json::json!({"status": "running"}))?;
//!             let results = run_tools(&calls).await?;
//!             yield CallbackYield::Continuation(next_completion(results).await?);
//!         })
//!     })
//!     .build()?;
//!
//! let body = encode_output_as_bytes(tool_stream(fragment_stream_from_sse(bytes), options));
//! ```

#![deny(unsafe_code)]

pub mod error;
pub mod format;
pub mod orchestrator;
pub mod streaming;
pub mod types;
pub mod utils;

pub use error::{ErrorCategory, Result, ToolStreamError};

/// Commonly used items
pub mod prelude {
    pub use crate::error::{ErrorCategory, Result, ToolStreamError};
    pub use crate::format::{OutputFormat, ResponseChannel};
    pub use crate::orchestrator::{
        BlockingToolStream, BlockingToolStreamOptions, EventStream, FragmentIter, FragmentStream,
        OutputStream, RecursionGuard, StreamOptions, ToolStreamConfig, ToolStreamHandle,
        ToolStreamOptions, YieldIter, YieldStream, blocking_tool_stream, fragment_stream,
        tool_event_stream, tool_stream, tool_stream_with_cancel,
    };
    pub use crate::streaming::{
        ChoiceSelector, OutputByteStream, STREAM_DATA_HEADER, encode_output_as_bytes,
        fragment_stream_from_sse, parse_fragment,
    };
    pub use crate::types::{
        AccumulatedToolCall, CallbackYield, Conversation, ConversationMessage, Fragment,
        OutputEvent, ToolCallDelta, ToolCallReceived,
    };
    pub use crate::utils::cancel::CancelHandle;
}
