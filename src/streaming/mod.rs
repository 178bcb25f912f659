//! Streaming building blocks
//!
//! Per-fragment reading and tool-call accumulation shared by both multiplexer
//! modes, plus the SSE decoder in front and the byte encoder behind them.

pub mod accumulator;
pub mod encoder;
pub mod reader;
pub mod sse;

pub use accumulator::ToolCallAccumulator;
pub use encoder::{OutputByteStream, STREAM_DATA_HEADER, encode_output_as_bytes};
pub use reader::{ChoiceSelector, FragmentReader, FragmentStep};
pub use sse::{DONE_SENTINEL, fragment_stream_from_sse, parse_fragment};
