// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Span and position types for tracking source locations.

use chumsky::span::SimpleSpan;

/// A span representing a range in the source code.
///
/// This is an alias for chumsky's `SimpleSpan`, which tracks byte offsets.
/// The span is a half-open range `[start, end)`.
pub type Span = SimpleSpan<usize>;

/// A resolved source position for diagnostics.
///
/// Lines and columns are 0-based internally; [`std::fmt::Display`] renders
/// them 1-based the way editors count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Byte offset into the sanitized source buffer.
    pub offset: usize,
    /// 0-based line number.
    pub line: usize,
    /// 0-based column number, counted in characters from the line start.
    pub column: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line + 1, self.column + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display_is_one_based() {
        let pos = Position {
            offset: 10,
            line: 2,
            column: 4,
        };
        assert_eq!(pos.to_string(), "line 3, column 5");
    }
}
