//! Error types for siumai-toolstream
//!
//! Every failure raised by the engine unwinds the whole call chain: the output
//! sequence ends with the error and nothing is retried internally.

use thiserror::Error;

/// Errors that can occur while multiplexing a tool-call aware stream
#[derive(Error, Debug)]
pub enum ToolStreamError {
    /// A tool-call delta seen for the first time lacked its `id` or function name
    #[error("malformed tool call at index {index}: first delta is missing `{missing}`")]
    MalformedToolCall { index: usize, missing: &'static str },

    /// An argument delta targeted a slot that cannot be merged into
    #[error("malformed tool call merge at index {index}: {reason}")]
    MalformedMerge { index: usize, reason: String },

    /// The model finished with `tool_calls` but no execution callback was configured
    #[error("tool calls were received but no execute-tool-calls callback was set")]
    MissingToolHandler,

    /// A continuation chain went deeper than the configured bound
    #[error("maximum recursion depth exceeded (max_depth = {max_depth})")]
    RecursionExceeded { max_depth: usize },

    /// The upstream fragment stream failed
    #[error("stream error: {0}")]
    StreamError(String),

    /// A user callback reported a failure through its yield sequence
    #[error("callback error: {0}")]
    CallbackError(String),

    /// A conversation message could not be built from the given parts
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Invalid caller-supplied configuration
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// JSON encoding or decoding failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of a [`ToolStreamError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The transport broke the tool-call wire contract
    Protocol,
    /// The caller wired the engine incorrectly
    Configuration,
    /// A runaway tool-call -> continuation loop
    Recursion,
    /// The fragment stream itself failed
    Upstream,
    /// A tool-layer callback failed
    Callback,
    /// JSON encoding or decoding failed
    Serialization,
}

impl ToolStreamError {
    /// Classify the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MalformedToolCall { .. } | Self::MalformedMerge { .. } => ErrorCategory::Protocol,
            Self::MissingToolHandler | Self::ConfigError(_) => ErrorCategory::Configuration,
            Self::RecursionExceeded { .. } => ErrorCategory::Recursion,
            Self::StreamError(_) => ErrorCategory::Upstream,
            Self::CallbackError(_) | Self::InvalidMessage(_) => ErrorCategory::Callback,
            Self::Serialization(_) => ErrorCategory::Serialization,
        }
    }

    /// Convenience constructor for callback failures.
    pub fn callback(message: impl Into<String>) -> Self {
        Self::CallbackError(message.into())
    }

    /// Convenience constructor for upstream stream failures.
    pub fn stream(message: impl Into<String>) -> Self {
        Self::StreamError(message.into())
    }
}

/// Result type for siumai-toolstream operations
pub type Result<T> = std::result::Result<T, ToolStreamError>;
