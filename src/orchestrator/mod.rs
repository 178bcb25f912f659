//! Stream multiplexer
//!
//! Drives one completion turn: forwards text, folds tool-call deltas, hands
//! finished batches to the tool layer and runs every continuation it yields
//! through the same cycle, one level deeper. Two execution modes share the
//! reading, accumulation and dispatch logic:
//!
//! - [`tool_stream`] for async sources and callbacks
//! - [`blocking_tool_stream`] for iterators, driven by an explicit frame stack

pub mod blocking;
pub mod dispatcher;
pub mod guard;
pub mod options;
pub mod stream;

pub use blocking::{
    BlockingToolStream, BlockingToolStreamOptions, FragmentIter, YieldIter, blocking_tool_stream,
};
pub use dispatcher::{Dispatch, interpret_yield, normalize_payload};
pub use guard::{DEFAULT_MAX_RECURSION_DEPTH, RecursionGuard};
pub use options::{
    ExecuteToolCallsFn, StreamOptions, StreamOptionsBuilder, ToolCallReceivedFn, ToolStreamConfig,
};
pub use stream::{
    EventStream, FragmentStream, OutputStream, ToolStreamHandle, ToolStreamOptions, YieldStream,
    fragment_stream, tool_event_stream, tool_stream, tool_stream_with_cancel,
};
