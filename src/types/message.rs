//! Conversation messages
//!
//! The conversation is owned by the tool layer: the execution callback appends
//! one assistant message for the whole finished batch and one tool message per
//! executed call, in call order, before yielding the continuation stream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::events::AccumulatedToolCall;
use crate::error::{Result, ToolStreamError};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// Tool call recorded on an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: MessageFunction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFunction {
    pub name: String,
    pub arguments: String,
}

/// One message of the conversation the service consumes on each (re)invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<MessageToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ConversationMessage {
    fn plain(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::Assistant, content)
    }

    /// Assistant message summarizing a finished batch of tool calls.
    pub fn tool_calls(calls: &[AccumulatedToolCall]) -> Result<Self> {
        if calls.is_empty() {
            return Err(ToolStreamError::InvalidMessage(
                "a tool calls message needs at least one tool call".to_string(),
            ));
        }
        let tool_calls = calls
            .iter()
            .map(|call| MessageToolCall {
                id: call.id.clone(),
                kind: "function".to_string(),
                function: MessageFunction {
                    name: call.function_name.clone(),
                    arguments: call.arguments.clone(),
                },
            })
            .collect();
        Ok(Self {
            role: MessageRole::Assistant,
            content: String::new(),
            tool_calls: Some(tool_calls),
            tool_call_id: None,
        })
    }

    /// Tool message carrying the JSON-encoded result of one call.
    pub fn tool_result(call: &AccumulatedToolCall, result: &Value) -> Result<Self> {
        if result.is_null() {
            return Err(ToolStreamError::InvalidMessage(format!(
                "tool call `{}` produced no result",
                call.id
            )));
        }
        Ok(Self {
            role: MessageRole::Tool,
            content: serde_json::to_string(result)?,
            tool_calls: None,
            tool_call_id: Some(call.id.clone()),
        })
    }
}

/// Append-only message list, single writer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<ConversationMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ConversationMessage) {
        self.messages.push(message);
    }

    /// Append the assistant message for a finished batch.
    pub fn push_tool_calls(&mut self, calls: &[AccumulatedToolCall]) -> Result<()> {
        self.messages.push(ConversationMessage::tool_calls(calls)?);
        Ok(())
    }

    /// Append the result message for one executed call.
    pub fn push_tool_result(&mut self, call: &AccumulatedToolCall, result: &Value) -> Result<()> {
        self.messages
            .push(ConversationMessage::tool_result(call, result)?);
        Ok(())
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<ConversationMessage> {
        self.messages
    }
}

impl From<Vec<ConversationMessage>> for Conversation {
    fn from(messages: Vec<ConversationMessage>) -> Self {
        Self { messages }
    }
}
