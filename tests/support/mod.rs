//! Shared helpers for the multiplexer integration tests
//!
//! Every test binary compiles this module and uses a subset of it.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use futures::{Stream, StreamExt, stream};
use siumai_toolstream::prelude::*;

/// Load an `.sse` fixture and split it into SSE event chunks (separated by blank lines)
#[allow(dead_code)]
pub fn load_sse_fixture_as_bytes(
    name: &str,
) -> io::Result<Vec<std::result::Result<Vec<u8>, io::Error>>> {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    let raw = std::fs::read_to_string(path)?;
    let normalized = raw.replace("\r\n", "\n");
    let mut out = Vec::new();
    for chunk in normalized.split("\n\n") {
        let s = chunk.trim_end_matches('\n');
        if s.is_empty() {
            continue;
        }
        let mut owned = String::from(s);
        owned.push_str("\n\n");
        out.push(Ok(owned.into_bytes()));
    }
    Ok(out)
}

/// Script from the end-to-end scenario: two tool calls, the first with split
/// arguments, then the `tool_calls` finish reason.
#[allow(dead_code)]
pub fn two_tool_calls_script() -> Vec<Fragment> {
    vec![
        Fragment::tool_calls(vec![ToolCallDelta::start(0, "a", "f", Some("{\"x\":"))]),
        Fragment::tool_calls(vec![ToolCallDelta::arguments(0, "1}")]),
        Fragment::tool_calls(vec![ToolCallDelta::start(1, "b", "g", Some("{}"))]),
        Fragment::finish("tool_calls"),
    ]
}

/// One turn that requests a single tool call.
#[allow(dead_code)]
pub fn single_tool_call_turn(id: &str) -> Vec<Fragment> {
    vec![
        Fragment::tool_calls(vec![ToolCallDelta::start(0, id, "lookup", Some("{}"))]),
        Fragment::finish("tool_calls"),
    ]
}

#[allow(dead_code)]
pub fn pending(index: usize) -> serde_json::Value {
    serde_json::json!({"status": "pending", "index": index})
}

#[allow(dead_code)]
pub fn done(index: usize) -> serde_json::Value {
    serde_json::json!({"status": "done", "index": index})
}

#[allow(dead_code)]
pub fn fragments(items: Vec<Fragment>) -> FragmentStream {
    Box::pin(stream::iter(items.into_iter().map(Ok)))
}

#[allow(dead_code)]
pub fn fragment_iter(items: Vec<Fragment>) -> FragmentIter {
    Box::new(items.into_iter().map(Ok))
}

/// Box a yield stream, pinning down its item type.
#[allow(dead_code)]
pub fn yields<S>(s: S) -> YieldStream
where
    S: Stream<Item = Result<CallbackYield<FragmentStream>>> + Send + 'static,
{
    Box::pin(s)
}

#[allow(dead_code)]
pub fn yield_iter(items: Vec<CallbackYield<FragmentIter>>) -> YieldIter {
    Box::new(items.into_iter().map(Ok))
}

#[allow(dead_code)]
pub async fn collect_lines(stream: OutputStream) -> Vec<Result<String>> {
    stream.collect().await
}

/// Flag set when the wrapped source is dropped.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct DropFlag(Arc<AtomicBool>);

#[allow(dead_code)]
impl DropFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Fragment source that records when it is released.
#[allow(dead_code)]
pub struct TrackedStream {
    inner: FragmentStream,
    dropped: DropFlag,
}

#[allow(dead_code)]
impl TrackedStream {
    /// Yields `items` and then stays pending forever unless `finite`.
    pub fn new(items: Vec<Fragment>, finite: bool) -> (Self, DropFlag) {
        let dropped = DropFlag::default();
        let head = stream::iter(items.into_iter().map(Ok));
        let inner: FragmentStream = if finite {
            Box::pin(head)
        } else {
            Box::pin(head.chain(stream::pending()))
        };
        (
            Self {
                inner,
                dropped: dropped.clone(),
            },
            dropped,
        )
    }
}

impl Stream for TrackedStream {
    type Item = Result<Fragment>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().inner.poll_next_unpin(cx)
    }
}

impl Drop for TrackedStream {
    fn drop(&mut self) {
        self.dropped.0.store(true, Ordering::SeqCst);
    }
}

/// Blocking counterpart of [`TrackedStream`], always finite.
#[allow(dead_code)]
pub struct TrackedIter {
    inner: std::vec::IntoIter<Fragment>,
    dropped: DropFlag,
}

#[allow(dead_code)]
impl TrackedIter {
    pub fn new(items: Vec<Fragment>) -> (Self, DropFlag) {
        let dropped = DropFlag::default();
        (
            Self {
                inner: items.into_iter(),
                dropped: dropped.clone(),
            },
            dropped,
        )
    }
}

impl Iterator for TrackedIter {
    type Item = Result<Fragment>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Ok)
    }
}

impl Drop for TrackedIter {
    fn drop(&mut self) {
        self.dropped.0.store(true, Ordering::SeqCst);
    }
}

/// Install a test-writer subscriber once; filtered by `RUST_LOG`.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Decode one raw chunk payload, as a provider would send it.
#[allow(dead_code)]
pub fn wire_fragment(data: &str) -> Fragment {
    parse_fragment(data)
        .expect("valid fragment payload")
        .expect("not a sentinel")
}

/// A chunk whose tool-call index is `u64::MAX`.
#[allow(dead_code)]
pub const EXTREME_INDEX_CHUNK: &str = r#"{"choices":[{"index":0,"delta":{"tool_calls":[{"index":18446744073709551615,"id":"a","type":"function","function":{"name":"f","arguments":"{}"}}]}}]}"#;
