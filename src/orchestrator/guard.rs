//! Recursion bound for continuation chains.

use crate::error::{Result, ToolStreamError};

/// Default bound on nested continuations.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 5;

/// Depth of the current multiplexer invocation.
///
/// The top-level invocation runs at depth 0; every continuation entered from
/// it runs one level deeper. Entering fails once `max_depth` is reached, so
/// exactly `max_depth` nested continuations are allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecursionGuard {
    depth: usize,
    max_depth: usize,
}

impl RecursionGuard {
    /// Guard for a top-level invocation.
    pub fn new(max_depth: usize) -> Self {
        Self {
            depth: 0,
            max_depth,
        }
    }

    /// Guard for a nested invocation one level deeper.
    pub fn enter(&self) -> Result<Self> {
        if self.depth >= self.max_depth {
            return Err(ToolStreamError::RecursionExceeded {
                max_depth: self.max_depth,
            });
        }
        Ok(Self {
            depth: self.depth + 1,
            max_depth: self.max_depth,
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for RecursionGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RECURSION_DEPTH)
    }
}
