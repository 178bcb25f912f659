//! Fragment Reader
//!
//! Selects the active choice of every fragment, remembers the latest finish
//! reason and classifies the delta. Pulling the next fragment is left to the
//! driver, so a fragment is only requested once the previous one has been
//! fully processed.

use std::fmt;
use std::sync::Arc;

use crate::types::{Choice, FINISH_REASON_TOOL_CALLS, Fragment, ToolCallDelta};

type SelectFn = dyn Fn(&[Choice]) -> Option<usize> + Send + Sync;

/// Picks the choice to follow in each fragment.
///
/// Multi-choice fan-out is out of scope: exactly one choice is followed.
#[derive(Clone)]
pub struct ChoiceSelector(Arc<SelectFn>);

impl ChoiceSelector {
    /// Follow the first choice.
    pub fn first() -> Self {
        Self::index(0)
    }

    /// Follow the choice at a fixed position.
    pub fn index(position: usize) -> Self {
        Self(Arc::new(move |choices: &[Choice]| {
            (position < choices.len()).then_some(position)
        }))
    }

    /// Follow the choice returned by `select` (a position into the slice).
    pub fn custom<F>(select: F) -> Self
    where
        F: Fn(&[Choice]) -> Option<usize> + Send + Sync + 'static,
    {
        Self(Arc::new(select))
    }

    fn select(&self, choices: &[Choice]) -> Option<usize> {
        (self.0)(choices).filter(|position| *position < choices.len())
    }
}

impl Default for ChoiceSelector {
    fn default() -> Self {
        Self::first()
    }
}

impl fmt::Debug for ChoiceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChoiceSelector(..)")
    }
}

/// What one fragment contributes to the turn.
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentStep {
    /// Text to emit
    Text(String),
    /// Tool-call deltas to fold, in wire order
    ToolCalls(Vec<ToolCallDelta>),
    /// Nothing to do (no selectable choice, or an empty delta)
    Skip,
    /// The selected choice had no delta: stop reading
    EndOfTurn,
}

/// Per-turn reading state.
#[derive(Debug, Default)]
pub struct FragmentReader {
    selector: ChoiceSelector,
    finish_reason: Option<String>,
}

impl FragmentReader {
    pub fn new(selector: ChoiceSelector) -> Self {
        Self {
            selector,
            finish_reason: None,
        }
    }

    /// Classify one fragment, recording its finish reason first.
    pub fn read(&mut self, mut fragment: Fragment) -> FragmentStep {
        let Some(position) = self.selector.select(&fragment.choices) else {
            tracing::trace!(
                choices = fragment.choices.len(),
                "fragment has no selectable choice, skipping"
            );
            return FragmentStep::Skip;
        };
        let choice = fragment.choices.swap_remove(position);

        if let Some(reason) = choice.finish_reason.filter(|r| !r.is_empty()) {
            tracing::trace!(finish_reason = %reason, "finish reason observed");
            self.finish_reason = Some(reason);
        }

        let Some(delta) = choice.delta else {
            return FragmentStep::EndOfTurn;
        };

        match (delta.content, delta.tool_calls) {
            (Some(text), _) if !text.is_empty() => FragmentStep::Text(text),
            (_, Some(calls)) if !calls.is_empty() => FragmentStep::ToolCalls(calls),
            _ => FragmentStep::Skip,
        }
    }

    /// Latest non-empty finish reason seen so far.
    pub fn finish_reason(&self) -> Option<&str> {
        self.finish_reason.as_deref()
    }

    /// Whether the turn ended asking for tool execution.
    pub fn tool_calls_requested(&self) -> bool {
        self.finish_reason() == Some(FINISH_REASON_TOOL_CALLS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Delta;

    #[test]
    fn text_delta_is_emitted() {
        let mut reader = FragmentReader::default();
        assert_eq!(
            reader.read(Fragment::text("hi")),
            FragmentStep::Text("hi".into())
        );
        assert_eq!(reader.finish_reason(), None);
    }

    #[test]
    fn missing_delta_ends_the_turn() {
        let mut reader = FragmentReader::default();
        let step = reader.read(Fragment::with_choice(None, Some("stop")));
        assert_eq!(step, FragmentStep::EndOfTurn);
        assert_eq!(reader.finish_reason(), Some("stop"));
    }

    #[test]
    fn later_finish_reason_overrides_earlier() {
        let mut reader = FragmentReader::default();
        reader.read(Fragment::finish("length"));
        reader.read(Fragment::finish(FINISH_REASON_TOOL_CALLS));
        assert!(reader.tool_calls_requested());
        // An empty reason never clears a recorded one.
        reader.read(Fragment::finish(""));
        assert!(reader.tool_calls_requested());
    }

    #[test]
    fn empty_text_falls_through_to_tool_calls() {
        let mut reader = FragmentReader::default();
        let fragment = Fragment::with_choice(
            Some(Delta {
                content: Some(String::new()),
                tool_calls: Some(vec![ToolCallDelta::arguments(0, "{}")]),
                ..Default::default()
            }),
            None,
        );
        assert!(matches!(reader.read(fragment), FragmentStep::ToolCalls(calls) if calls.len() == 1));
    }

    #[test]
    fn no_choices_is_skipped() {
        let mut reader = FragmentReader::default();
        assert_eq!(reader.read(Fragment::default()), FragmentStep::Skip);
    }

    #[test]
    fn custom_selector_picks_choice() {
        let mut reader = FragmentReader::new(ChoiceSelector::custom(|choices| {
            choices.iter().position(|c| c.index == 1)
        }));
        let mut fragment = Fragment::text("first");
        let mut second = Fragment::text("second").choices.remove(0);
        second.index = 1;
        fragment.choices.push(second);
        assert_eq!(reader.read(fragment), FragmentStep::Text("second".into()));
    }

    #[test]
    fn out_of_range_selection_is_skipped() {
        let mut reader = FragmentReader::new(ChoiceSelector::custom(|_| Some(7)));
        assert_eq!(reader.read(Fragment::text("hi")), FragmentStep::Skip);
    }
}
