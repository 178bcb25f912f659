//! Continuation dispatch.
//!
//! Interprets callback yields independently of the execution mode: payloads
//! become `Data` events, continuations become a request to recurse one level
//! deeper. Both the suspending and the blocking multiplexer drive their yield
//! sequences through [`interpret_yield`], which keeps their ordering identical.

use serde_json::Value;

use super::guard::RecursionGuard;
use crate::error::Result;
use crate::types::{CallbackYield, OutputEvent};

/// What to do with one callback yield.
#[derive(Debug)]
pub enum Dispatch<S> {
    /// Emit the event
    Emit(OutputEvent),
    /// Run the full multiplexer cycle on `source` under `guard`, forwarding
    /// every event before the next yield is pulled
    Recurse { source: S, guard: RecursionGuard },
}

/// Wrap scalar payloads in a single-element array.
pub fn normalize_payload(payload: Value) -> Value {
    match payload {
        Value::Array(_) => payload,
        other => Value::Array(vec![other]),
    }
}

/// Interpret one callback yield produced at the level of `guard`.
pub fn interpret_yield<S>(item: CallbackYield<S>, guard: &RecursionGuard) -> Result<Dispatch<S>> {
    match item {
        CallbackYield::Event(payload) => Ok(Dispatch::Emit(OutputEvent::Data(normalize_payload(
            payload,
        )))),
        CallbackYield::Continuation(source) => {
            let guard = guard.enter()?;
            tracing::debug!(depth = guard.depth(), "entering continuation stream");
            Ok(Dispatch::Recurse { source, guard })
        }
    }
}
