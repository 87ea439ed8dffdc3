//! @acp:module "Spans"
//! @acp:summary "Offset ranges into the stripped header buffer"
//! @acp:domain codegen
//! @acp:layer data
//!
//! Offset ranges into the comment-stripped header buffer

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, stop)` into a stripped header buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub stop: usize,
}

impl Span {
    pub fn new(start: usize, stop: usize) -> Self {
        Self { start, stop }
    }

    pub fn len(&self) -> usize {
        self.stop.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.stop <= self.start
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.stop
    }

    /// Whether `self` lies entirely within `other`.
    ///
    /// An empty span is a subset of anything; nothing non-empty is a subset
    /// of an empty span.
    pub fn is_subset_of(&self, other: &Span) -> bool {
        if self.is_empty() {
            return true;
        }
        if other.is_empty() {
            return false;
        }
        other.contains(self.start) && other.contains(self.stop - 1)
    }
}

impl From<std::ops::Range<usize>> for Span {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start, self.stop)
    }
}
