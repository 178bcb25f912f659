//! Core types: wire fragments, engine events and conversation messages.

pub mod events;
pub mod fragment;
pub mod message;

pub use events::{AccumulatedToolCall, CallbackYield, OutputEvent, ToolCallReceived};
pub use fragment::{
    Choice, Delta, FINISH_REASON_TOOL_CALLS, Fragment, FunctionDelta, ToolCallDelta,
};
pub use message::{
    Conversation, ConversationMessage, MessageFunction, MessageRole, MessageToolCall,
};
