//! Cancellation utilities
//!
//! First-class cancellation for multiplexer output. Cancelling stops the
//! wrapped stream at the next item boundary and drops it, which drops every
//! nested turn and the fragment sources they were reading.

use std::pin::Pin;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use futures::Stream;

/// A handle that can be used to request cancellation.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }

    /// Request cancellation. The wrapped stream ends before yielding anything
    /// else and releases its sources.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Make a boxed stream cancellable and return its cancel handle.
pub fn make_cancellable_stream<T>(
    stream: Pin<Box<dyn Stream<Item = T> + Send>>,
) -> (Pin<Box<dyn Stream<Item = T> + Send>>, CancelHandle)
where
    T: Send + 'static,
{
    let flag = Arc::new(AtomicBool::new(false));
    let handle = CancelHandle::new(flag.clone());
    let mut inner = stream;
    let s = async_stream::stream! {
        use futures::StreamExt;
        loop {
            if flag.load(Ordering::SeqCst) { break; }
            let Some(item) = inner.next().await else { break; };
            // Cancelled while waiting: discard the item.
            if flag.load(Ordering::SeqCst) { break; }
            yield item;
        }
        drop(inner);
        tracing::trace!("cancellable stream finished");
    };
    (Box::pin(s), handle)
}
