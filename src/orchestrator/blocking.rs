//! Blocking multiplexer.
//!
//! Same ordering as the suspending mode, driven by an explicit work list of
//! frames instead of call recursion: each frame is one turn at one depth, the
//! top frame is the one being read. Any wait (fragment arrival, tool latency)
//! blocks the thread pulling from the iterator.

use std::collections::VecDeque;

use super::dispatcher::{Dispatch, interpret_yield};
use super::guard::RecursionGuard;
use super::options::StreamOptions;
use crate::error::{Result, ToolStreamError};
use crate::streaming::{FragmentReader, FragmentStep, ToolCallAccumulator};
use crate::types::{CallbackYield, Fragment, OutputEvent, ToolCallDelta};

/// Raw completion iterator produced by a blocking transport.
pub type FragmentIter = Box<dyn Iterator<Item = Result<Fragment>> + Send>;

/// Yield sequence returned by a blocking-mode callback.
pub type YieldIter = Box<dyn Iterator<Item = Result<CallbackYield<FragmentIter>>> + Send>;

/// Options for the blocking multiplexer.
pub type BlockingToolStreamOptions = StreamOptions<YieldIter>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Reading,
    Dispatching,
}

struct Frame {
    /// `None` once reading has ended
    source: Option<FragmentIter>,
    reader: FragmentReader,
    accumulator: ToolCallAccumulator,
    /// Deltas of the current fragment not folded yet
    pending: VecDeque<ToolCallDelta>,
    /// Active callback yield sequence
    yields: Option<YieldIter>,
    guard: RecursionGuard,
    phase: Phase,
}

impl Frame {
    fn new(source: FragmentIter, options: &BlockingToolStreamOptions, guard: RecursionGuard) -> Self {
        Self {
            source: Some(source),
            reader: FragmentReader::new(options.choice_selector.clone()),
            accumulator: ToolCallAccumulator::new(),
            pending: VecDeque::new(),
            yields: None,
            guard,
            phase: Phase::Reading,
        }
    }

    fn finish_reading(&mut self, options: &BlockingToolStreamOptions) -> Result<()> {
        // Release the upstream connection before tools run.
        self.source = None;
        self.phase = Phase::Dispatching;

        if self.reader.tool_calls_requested() {
            let callback = options
                .on_execute_tool_calls
                .as_ref()
                .ok_or(ToolStreamError::MissingToolHandler)?;
            let calls = std::mem::take(&mut self.accumulator).finalize();
            tracing::debug!(
                depth = self.guard.depth(),
                tool_calls = calls.len(),
                "dispatching finished tool calls"
            );
            self.yields = Some(callback(calls));
        }
        Ok(())
    }
}

/// Blocking multiplexer output.
///
/// Iterating yields encoded output lines; [`next_event`](Self::next_event)
/// yields the unformatted events. After an error the iterator is exhausted and
/// every frame has been dropped.
pub struct BlockingToolStream {
    frames: Vec<Frame>,
    options: BlockingToolStreamOptions,
}

/// Multiplex `source` in blocking mode.
pub fn blocking_tool_stream<I>(source: I, options: BlockingToolStreamOptions) -> BlockingToolStream
where
    I: IntoIterator<Item = Result<Fragment>>,
    I::IntoIter: Send + 'static,
{
    BlockingToolStream::new(source, options)
}

impl BlockingToolStream {
    pub fn new<I>(source: I, options: BlockingToolStreamOptions) -> Self
    where
        I: IntoIterator<Item = Result<Fragment>>,
        I::IntoIter: Send + 'static,
    {
        let guard = RecursionGuard::new(options.max_recursion_depth());
        let root = Frame::new(Box::new(source.into_iter()), &options, guard);
        Self {
            frames: vec![root],
            options,
        }
    }

    /// Depth of the turn currently being processed, `None` once finished.
    pub fn depth(&self) -> Option<usize> {
        self.frames.last().map(|frame| frame.guard.depth())
    }

    /// Pull the next unformatted event.
    pub fn next_event(&mut self) -> Option<Result<OutputEvent>> {
        match self.step() {
            Ok(event) => event.map(Ok),
            Err(err) => {
                self.frames.clear();
                Some(Err(err))
            }
        }
    }

    /// Iterate over unformatted events instead of encoded lines.
    pub fn events(self) -> impl Iterator<Item = Result<OutputEvent>> {
        let mut this = self;
        std::iter::from_fn(move || this.next_event())
    }

    fn step(&mut self) -> Result<Option<OutputEvent>> {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                return Ok(None);
            };

            if let Some(yields) = frame.yields.as_mut() {
                match yields.next() {
                    Some(item) => match interpret_yield(item?, &frame.guard)? {
                        Dispatch::Emit(event) => return Ok(Some(event)),
                        Dispatch::Recurse { source, guard } => {
                            let nested = Frame::new(source, &self.options, guard);
                            self.frames.push(nested);
                        }
                    },
                    None => frame.yields = None,
                }
                continue;
            }

            if let Some(delta) = frame.pending.pop_front() {
                if let Some(received) = frame.accumulator.observe(delta)?
                    && let Some(callback) = &self.options.on_tool_call_received
                {
                    frame.yields = Some(callback(received));
                }
                continue;
            }

            match frame.phase {
                Phase::Reading => {
                    let next = frame.source.as_mut().and_then(|source| source.next());
                    match next {
                        Some(fragment) => match frame.reader.read(fragment?) {
                            FragmentStep::Text(text) => return Ok(Some(OutputEvent::Text(text))),
                            FragmentStep::ToolCalls(deltas) => frame.pending.extend(deltas),
                            FragmentStep::Skip => {}
                            FragmentStep::EndOfTurn => frame.finish_reading(&self.options)?,
                        },
                        None => frame.finish_reading(&self.options)?,
                    }
                }
                Phase::Dispatching => {
                    self.frames.pop();
                }
            }
        }
    }
}

impl Iterator for BlockingToolStream {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let format = self.options.format();
        match self.next_event()? {
            Ok(event) => match format.format(&event) {
                Ok(line) => Some(Ok(line)),
                Err(err) => {
                    self.frames.clear();
                    Some(Err(err))
                }
            },
            Err(err) => Some(Err(err)),
        }
    }
}

impl std::iter::FusedIterator for BlockingToolStream {}
