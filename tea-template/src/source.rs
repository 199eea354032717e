use std::fmt;

use serde::{Deserialize, Serialize};

/// Location of a node in the template source. Only used for diagnostics;
/// replacement nodes inherit the span of the node they stand in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceInfo {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl SourceInfo {
    pub fn new(line: usize, start: usize, end: usize) -> Self {
        Self { line, start, end }
    }

    pub fn single_point(line: usize, position: usize) -> Self {
        Self::new(line, position, position)
    }

    pub fn is_unknown(&self) -> bool {
        self.line == 0 && self.start == 0 && self.end == 0
    }

    /// Smallest span covering both inputs. Unknown spans are ignored.
    pub fn union(a: &Self, b: &Self) -> Self {
        if a.is_unknown() {
            return *b;
        }
        if b.is_unknown() {
            return *a;
        }

        let (line, start) = if a.start <= b.start {
            (a.line, a.start)
        } else {
            (b.line, b.start)
        };
        Self::new(line, start, a.end.max(b.end))
    }
}

impl fmt::Display for SourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, {}..{}", self.line, self.start, self.end)
    }
}
