//! Multiplexer configuration.
//!
//! [`ToolStreamConfig`] is plain data that can be deserialized from the
//! caller's own configuration files. [`StreamOptions`] adds the parts that
//! cannot be: the choice selector and the two tool-layer callbacks.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::guard::DEFAULT_MAX_RECURSION_DEPTH;
use crate::error::{Result, ToolStreamError};
use crate::format::OutputFormat;
use crate::streaming::ChoiceSelector;
use crate::types::{AccumulatedToolCall, ToolCallReceived};

/// Upper bound accepted by [`ToolStreamConfig::validate`].
const MAX_ALLOWED_RECURSION_DEPTH: usize = 64;

/// Serializable multiplexer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ToolStreamConfig {
    /// Output encoding
    pub format: OutputFormat,
    /// Maximum number of nested continuations
    pub max_recursion_depth: usize,
}

impl Default for ToolStreamConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
        }
    }
}

impl ToolStreamConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_recursion_depth > MAX_ALLOWED_RECURSION_DEPTH {
            return Err(ToolStreamError::ConfigError(format!(
                "max_recursion_depth must be at most {MAX_ALLOWED_RECURSION_DEPTH}, got {}",
                self.max_recursion_depth
            )));
        }
        Ok(())
    }
}

/// Callback fired once per newly seen tool-call index.
pub type ToolCallReceivedFn<S> = Arc<dyn Fn(ToolCallReceived) -> S + Send + Sync>;

/// Callback fired once per turn that finished with `tool_calls`.
pub type ExecuteToolCallsFn<S> = Arc<dyn Fn(Vec<AccumulatedToolCall>) -> S + Send + Sync>;

/// Full multiplexer options.
///
/// `S` is the yield sequence type the callbacks return: a stream in suspending
/// mode ([`ToolStreamOptions`](super::ToolStreamOptions)), an iterator in
/// blocking mode ([`BlockingToolStreamOptions`](super::BlockingToolStreamOptions)).
pub struct StreamOptions<S> {
    pub config: ToolStreamConfig,
    pub choice_selector: ChoiceSelector,
    pub on_tool_call_received: Option<ToolCallReceivedFn<S>>,
    pub on_execute_tool_calls: Option<ExecuteToolCallsFn<S>>,
}

impl<S> StreamOptions<S> {
    pub fn builder() -> StreamOptionsBuilder<S> {
        StreamOptionsBuilder::default()
    }

    pub fn format(&self) -> OutputFormat {
        self.config.format
    }

    pub fn max_recursion_depth(&self) -> usize {
        self.config.max_recursion_depth
    }
}

impl<S> Default for StreamOptions<S> {
    fn default() -> Self {
        Self {
            config: ToolStreamConfig::default(),
            choice_selector: ChoiceSelector::first(),
            on_tool_call_received: None,
            on_execute_tool_calls: None,
        }
    }
}

impl<S> Clone for StreamOptions<S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config,
            choice_selector: self.choice_selector.clone(),
            on_tool_call_received: self.on_tool_call_received.clone(),
            on_execute_tool_calls: self.on_execute_tool_calls.clone(),
        }
    }
}

impl<S> fmt::Debug for StreamOptions<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamOptions")
            .field("config", &self.config)
            .field("choice_selector", &self.choice_selector)
            .field(
                "has_tool_call_received",
                &self.on_tool_call_received.is_some(),
            )
            .field("has_execute_tool_calls", &self.on_execute_tool_calls.is_some())
            .finish()
    }
}

/// Builder for [`StreamOptions`]
pub struct StreamOptionsBuilder<S> {
    config: ToolStreamConfig,
    choice_selector: Option<ChoiceSelector>,
    on_tool_call_received: Option<ToolCallReceivedFn<S>>,
    on_execute_tool_calls: Option<ExecuteToolCallsFn<S>>,
}

impl<S> Default for StreamOptionsBuilder<S> {
    fn default() -> Self {
        Self {
            config: ToolStreamConfig::default(),
            choice_selector: None,
            on_tool_call_received: None,
            on_execute_tool_calls: None,
        }
    }
}

impl<S> StreamOptionsBuilder<S> {
    /// Replace the whole serializable config
    pub fn config(mut self, config: ToolStreamConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the output encoding
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Set the continuation depth bound
    pub fn max_recursion_depth(mut self, depth: usize) -> Self {
        self.config.max_recursion_depth = depth;
        self
    }

    /// Set the per-fragment choice selector
    pub fn choice_selector(mut self, selector: ChoiceSelector) -> Self {
        self.choice_selector = Some(selector);
        self
    }

    /// Set the tool-call-received callback
    pub fn on_tool_call_received<F>(mut self, callback: F) -> Self
    where
        F: Fn(ToolCallReceived) -> S + Send + Sync + 'static,
    {
        self.on_tool_call_received = Some(Arc::new(callback));
        self
    }

    /// Set the execute-tool-calls callback
    pub fn on_execute_tool_calls<F>(mut self, callback: F) -> Self
    where
        F: Fn(Vec<AccumulatedToolCall>) -> S + Send + Sync + 'static,
    {
        self.on_execute_tool_calls = Some(Arc::new(callback));
        self
    }

    /// Validate and build the options
    pub fn build(self) -> Result<StreamOptions<S>> {
        self.config.validate()?;
        Ok(StreamOptions {
            config: self.config,
            choice_selector: self.choice_selector.unwrap_or_default(),
            on_tool_call_received: self.on_tool_call_received,
            on_execute_tool_calls: self.on_execute_tool_calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Opts = StreamOptions<Vec<u8>>;

    #[test]
    fn defaults_match_documented_values() {
        let opts = Opts::default();
        assert_eq!(opts.format(), OutputFormat::ChannelEncoded);
        assert_eq!(opts.max_recursion_depth(), 5);
        assert!(opts.on_execute_tool_calls.is_none());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: ToolStreamConfig =
            serde_json::from_str(r#"{"format": "human-readable"}"#).unwrap();
        assert_eq!(config.format, OutputFormat::HumanReadable);
        assert_eq!(config.max_recursion_depth, DEFAULT_MAX_RECURSION_DEPTH);
    }

    #[test]
    fn config_reads_from_toml() {
        let config: ToolStreamConfig =
            toml::from_str("format = \"channel-encoded\"\nmax_recursion_depth = 2\n").unwrap();
        assert_eq!(config.max_recursion_depth, 2);
    }

    #[test]
    fn builder_rejects_absurd_depth() {
        let err = Opts::builder().max_recursion_depth(1000).build().unwrap_err();
        assert!(matches!(err, ToolStreamError::ConfigError(_)));
    }

    #[test]
    fn builder_sets_callbacks() {
        let opts = Opts::builder()
            .format(OutputFormat::HumanReadable)
            .on_execute_tool_calls(|calls| vec![calls.len() as u8])
            .build()
            .unwrap();
        let cb = opts.on_execute_tool_calls.as_ref().unwrap();
        assert_eq!(cb(Vec::new()), vec![0]);
        assert!(format!("{opts:?}").contains("has_execute_tool_calls: true"));
    }
}
