//! Suspending (async) multiplexer.
//!
//! Each turn is a lazy `try_stream!` over its fragment stream. Nested
//! continuations are genuine recursion through boxed streams, bounded by the
//! [`RecursionGuard`]; the outer turn is paused until the nested one is
//! exhausted. Dropping the returned stream drops every level at once.

use std::pin::Pin;
use std::sync::Arc;

use async_stream::try_stream;
use futures::{Stream, StreamExt};

use super::dispatcher::{Dispatch, interpret_yield};
use super::guard::RecursionGuard;
use super::options::StreamOptions;
use crate::error::{Result, ToolStreamError};
use crate::streaming::{FragmentReader, FragmentStep, ToolCallAccumulator};
use crate::types::{CallbackYield, Fragment, OutputEvent};
use crate::utils::cancel::{CancelHandle, make_cancellable_stream};

/// Raw completion stream produced by the transport.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<Fragment>> + Send>>;

/// Yield sequence returned by a suspending-mode callback.
pub type YieldStream = Pin<Box<dyn Stream<Item = Result<CallbackYield<FragmentStream>>> + Send>>;

/// Unformatted multiplexer output.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<OutputEvent>> + Send>>;

/// Formatted multiplexer output, one encoded line (or text chunk) per item.
pub type OutputStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Options for the suspending multiplexer.
pub type ToolStreamOptions = StreamOptions<YieldStream>;

/// Output stream with a first-class cancellation handle.
pub struct ToolStreamHandle {
    pub stream: OutputStream,
    pub cancel: CancelHandle,
}

/// Box any fragment stream into a [`FragmentStream`].
pub fn fragment_stream<S>(source: S) -> FragmentStream
where
    S: Stream<Item = Result<Fragment>> + Send + 'static,
{
    Box::pin(source)
}

/// Multiplex `source` into output events.
pub fn tool_event_stream<S>(source: S, options: ToolStreamOptions) -> EventStream
where
    S: Stream<Item = Result<Fragment>> + Send + 'static,
{
    let guard = RecursionGuard::new(options.max_recursion_depth());
    run_turn(Box::pin(source), Arc::new(options), guard)
}

/// Multiplex `source` into encoded output lines.
pub fn tool_stream<S>(source: S, options: ToolStreamOptions) -> OutputStream
where
    S: Stream<Item = Result<Fragment>> + Send + 'static,
{
    let format = options.format();
    Box::pin(
        tool_event_stream(source, options)
            .map(move |item| item.and_then(|event| format.format(&event))),
    )
}

/// Like [`tool_stream`], plus a handle that stops the stream at the next item boundary.
pub fn tool_stream_with_cancel<S>(source: S, options: ToolStreamOptions) -> ToolStreamHandle
where
    S: Stream<Item = Result<Fragment>> + Send + 'static,
{
    let (stream, cancel) = make_cancellable_stream(tool_stream(source, options));
    ToolStreamHandle { stream, cancel }
}

fn run_turn(
    source: FragmentStream,
    options: Arc<ToolStreamOptions>,
    guard: RecursionGuard,
) -> EventStream {
    Box::pin(turn_events(source, options, guard))
}

fn turn_events(
    mut source: FragmentStream,
    options: Arc<ToolStreamOptions>,
    guard: RecursionGuard,
) -> impl Stream<Item = Result<OutputEvent>> + Send {
    try_stream! {
        let mut reader = FragmentReader::new(options.choice_selector.clone());
        let mut accumulator = ToolCallAccumulator::new();

        while let Some(fragment) = source.next().await {
            match reader.read(fragment?) {
                FragmentStep::Text(text) => yield OutputEvent::Text(text),
                FragmentStep::ToolCalls(deltas) => {
                    for delta in deltas {
                        let Some(received) = accumulator.observe(delta)? else {
                            continue;
                        };
                        let Some(callback) = options.on_tool_call_received.clone() else {
                            continue;
                        };
                        let mut events = dispatch(callback(received), options.clone(), guard);
                        while let Some(event) = events.next().await {
                            yield event?;
                        }
                    }
                }
                FragmentStep::Skip => {}
                FragmentStep::EndOfTurn => break,
            }
        }
        // Release the upstream connection before tools run.
        drop(source);

        if reader.tool_calls_requested() {
            let callback = options
                .on_execute_tool_calls
                .clone()
                .ok_or(ToolStreamError::MissingToolHandler)?;
            let calls = accumulator.finalize();
            tracing::debug!(
                depth = guard.depth(),
                tool_calls = calls.len(),
                "dispatching finished tool calls"
            );
            let mut events = dispatch(callback(calls), options.clone(), guard);
            while let Some(event) = events.next().await {
                yield event?;
            }
        }
    }
}

fn dispatch(
    yields: YieldStream,
    options: Arc<ToolStreamOptions>,
    guard: RecursionGuard,
) -> EventStream {
    Box::pin(dispatch_events(yields, options, guard))
}

fn dispatch_events(
    mut yields: YieldStream,
    options: Arc<ToolStreamOptions>,
    guard: RecursionGuard,
) -> impl Stream<Item = Result<OutputEvent>> + Send {
    try_stream! {
        while let Some(item) = yields.next().await {
            match interpret_yield(item?, &guard)? {
                Dispatch::Emit(event) => yield event,
                Dispatch::Recurse { source, guard } => {
                    let mut nested = run_turn(source, options.clone(), guard);
                    while let Some(event) = nested.next().await {
                        yield event?;
                    }
                }
            }
        }
    }
}
