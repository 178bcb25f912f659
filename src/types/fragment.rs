//! Wire fragments
//!
//! One [`Fragment`] is one chat-completion chunk as delivered by the transport.
//! The shape mirrors the chat-completions streaming chunk so fragments can be
//! decoded straight from the SSE `data:` payload.

use serde::{Deserialize, Serialize};

/// Finish reason that marks a batch of tool calls as ready for execution.
pub const FINISH_REASON_TOOL_CALLS: &str = "tool_calls";

/// One incremental unit of a streamed completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// Candidate choices, usually exactly one
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// One candidate within a fragment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    /// Incremental content; absent means the turn is over
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<Delta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Incremental content of a choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Text delta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Partial tool calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallDelta>>,
}

/// Partial tool invocation.
///
/// `id` and the function name only travel on the first delta for an index;
/// later deltas carry argument chunks only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallDelta {
    /// Stable identifier of one logical tool call across fragments
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionDelta>,
}

/// Function part of a [`ToolCallDelta`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

impl ToolCallDelta {
    /// First delta for an index: carries the id, the function name and an
    /// optional first argument chunk.
    pub fn start(
        index: usize,
        id: impl Into<String>,
        function_name: impl Into<String>,
        arguments_chunk: Option<&str>,
    ) -> Self {
        Self {
            index,
            id: Some(id.into()),
            kind: Some("function".to_string()),
            function: Some(FunctionDelta {
                name: Some(function_name.into()),
                arguments: arguments_chunk.map(str::to_string),
            }),
        }
    }

    /// Follow-up delta for an index: carries an argument chunk only.
    pub fn arguments(index: usize, chunk: impl Into<String>) -> Self {
        Self {
            index,
            id: None,
            kind: None,
            function: Some(FunctionDelta {
                name: None,
                arguments: Some(chunk.into()),
            }),
        }
    }

    pub fn function_name(&self) -> Option<&str> {
        self.function.as_ref().and_then(|f| f.name.as_deref())
    }

    pub fn arguments_chunk(&self) -> Option<&str> {
        self.function.as_ref().and_then(|f| f.arguments.as_deref())
    }
}

impl Fragment {
    /// Single-choice fragment with the given delta and finish reason.
    pub fn with_choice(delta: Option<Delta>, finish_reason: Option<&str>) -> Self {
        Self {
            choices: vec![Choice {
                index: 0,
                delta,
                finish_reason: finish_reason.map(str::to_string),
            }],
        }
    }

    /// Text-only fragment.
    pub fn text(content: impl Into<String>) -> Self {
        Self::with_choice(
            Some(Delta {
                content: Some(content.into()),
                ..Default::default()
            }),
            None,
        )
    }

    /// Fragment carrying tool-call deltas.
    pub fn tool_calls(deltas: Vec<ToolCallDelta>) -> Self {
        Self::with_choice(
            Some(Delta {
                tool_calls: Some(deltas),
                ..Default::default()
            }),
            None,
        )
    }

    /// Terminal fragment: empty delta plus a finish reason.
    pub fn finish(reason: &str) -> Self {
        Self::with_choice(Some(Delta::default()), Some(reason))
    }
}
