//! Engine events
//!
//! Output events are the only externally observable payloads; callback yields
//! are what the tool layer hands back to the engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tool call reassembled from its deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulatedToolCall {
    /// Index of the call within its batch
    pub index: usize,
    pub id: String,
    pub function_name: String,
    /// Raw JSON arguments, concatenated from every chunk in arrival order
    pub arguments: String,
}

impl AccumulatedToolCall {
    /// Parse the accumulated arguments as JSON.
    ///
    /// An empty argument string parses as an empty object.
    pub fn parse_arguments(&self) -> serde_json::Result<Value> {
        if self.arguments.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&self.arguments)
    }
}

/// Parameters handed to the tool-call-received callback on first sighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallReceived {
    pub index: usize,
    pub id: String,
    pub function_name: String,
}

/// Event produced by the multiplexer.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// Text delta from the model
    Text(String),
    /// Structured status/result payload from a callback, always a JSON array
    Data(Value),
}

/// Item produced by a user callback.
///
/// `S` is the fragment source type of the execution mode: a stream in
/// suspending mode, an iterator in blocking mode.
pub enum CallbackYield<S> {
    /// Status/result payload to surface as a `Data` event
    Event(Value),
    /// Fresh completion to recurse into
    Continuation(S),
}

impl<S> CallbackYield<S> {
    /// Surface a serializable payload.
    pub fn event(payload: impl Serialize) -> serde_json::Result<Self> {
        Ok(Self::Event(serde_json::to_value(payload)?))
    }
}

impl<S> std::fmt::Debug for CallbackYield<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Event(payload) => f.debug_tuple("Event").field(payload).finish(),
            Self::Continuation(_) => f.write_str("Continuation(..)"),
        }
    }
}
