//! Half-open index windows over a record source

use crate::error::ConfigError;
use std::fmt;

/// A half-open `[start, end)` range of record indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IndexWindow {
    start: usize,
    end: usize,
}

impl IndexWindow {
    /// Create a window, rejecting `start > end`
    pub fn new(start: usize, end: usize) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Window covering every record of a source with `total` records
    pub fn full(total: usize) -> Self {
        Self {
            start: 0,
            end: total,
        }
    }

    /// Clamp both bounds against the authoritative record count.
    ///
    /// A window entirely past the end of the data degenerates to an
    /// empty window at `total`; it is never an error.
    pub fn clamp(self, total: usize) -> Self {
        Self {
            start: self.start.min(total),
            end: self.end.min(total),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of indices in the window
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if `index` falls inside the window
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }
}

impl fmt::Display for IndexWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
