//! Tool Call Accumulator
//!
//! Reassembles tool calls from per-index deltas. Slots are keyed by the wire
//! index, so indices that never showed up take no space and any index value
//! is accepted.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::error::{Result, ToolStreamError};
use crate::types::{AccumulatedToolCall, ToolCallDelta, ToolCallReceived};

/// Partially reassembled tool call.
#[derive(Debug, Clone)]
struct ToolCallSlot {
    id: String,
    function_name: String,
    /// `None` when the first delta carried no argument chunk
    arguments: Option<String>,
}

/// Per-turn tool-call accumulator.
#[derive(Debug, Default)]
pub struct ToolCallAccumulator {
    slots: BTreeMap<usize, ToolCallSlot>,
}

impl ToolCallAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one delta into its slot.
    ///
    /// Returns the first-sighting parameters when the delta opened a new slot,
    /// `None` when it was merged into an existing one.
    pub fn observe(&mut self, delta: ToolCallDelta) -> Result<Option<ToolCallReceived>> {
        let index = delta.index;
        match self.slots.entry(index) {
            Entry::Occupied(mut slot) => {
                merge_into(slot.get_mut(), index, &delta)?;
                Ok(None)
            }
            Entry::Vacant(empty) => {
                let ToolCallDelta { id, function, .. } = delta;
                let id = id
                    .filter(|id| !id.is_empty())
                    .ok_or(ToolStreamError::MalformedToolCall {
                        index,
                        missing: "id",
                    })?;
                let (name, arguments) = function
                    .map(|f| (f.name, f.arguments))
                    .unwrap_or_default();
                let function_name = name.filter(|n| !n.is_empty()).ok_or(
                    ToolStreamError::MalformedToolCall {
                        index,
                        missing: "function.name",
                    },
                )?;

                tracing::debug!(index, id = %id, function = %function_name, "tool call started");
                let received = ToolCallReceived {
                    index,
                    id: id.clone(),
                    function_name: function_name.clone(),
                };
                empty.insert(ToolCallSlot {
                    id,
                    function_name,
                    arguments,
                });
                Ok(Some(received))
            }
        }
    }

    /// Accumulated calls in index order.
    pub fn finalize(self) -> Vec<AccumulatedToolCall> {
        self.slots
            .into_iter()
            .map(|(index, slot)| AccumulatedToolCall {
                index,
                id: slot.id,
                function_name: slot.function_name,
                arguments: slot.arguments.unwrap_or_default(),
            })
            .collect()
    }

    /// Number of tool calls seen so far.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn merge_into(slot: &mut ToolCallSlot, index: usize, delta: &ToolCallDelta) -> Result<()> {
    if let Some(id) = delta.id.as_deref().filter(|id| *id != slot.id && !id.is_empty()) {
        tracing::warn!(index, recorded = %slot.id, received = %id, "ignoring id change on tool call merge");
    }
    if let Some(name) = delta
        .function_name()
        .filter(|name| *name != slot.function_name && !name.is_empty())
    {
        tracing::warn!(index, recorded = %slot.function_name, received = %name, "ignoring name change on tool call merge");
    }

    let chunk = delta
        .arguments_chunk()
        .ok_or_else(|| ToolStreamError::MalformedMerge {
            index,
            reason: "delta carries no arguments chunk".to_string(),
        })?;
    let arguments = slot
        .arguments
        .as_mut()
        .ok_or_else(|| ToolStreamError::MalformedMerge {
            index,
            reason: "slot has no prior arguments string".to_string(),
        })?;

    tracing::trace!(index, chunk_len = chunk.len(), "merging tool call arguments");
    arguments.push_str(chunk);
    Ok(())
}
