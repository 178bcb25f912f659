//! Utility modules for siumai-toolstream

pub mod cancel;

pub use cancel::{CancelHandle, make_cancellable_stream};
