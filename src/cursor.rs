// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Position-tracking cursor over the sanitized source buffer.
//!
//! The cursor owns the sanitized source for the duration of one parse. The
//! buffer always ends with a `\0` sentinel (appended by sanitization), which
//! turns every bounds check in the loader into a plain character comparison:
//! reading at or past the end yields `'\0'` and never panics.
//!
//! Backtracking via [`Cursor::mark`]/[`Cursor::reset`] is used only for
//! bounded lookahead (e.g., distinguishing a mapping key from a plain
//! scalar), never for unbounded re-parsing.

use crate::span::Position;

/// A saved cursor state for bounded backtracking.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Mark {
    offset: usize,
    line: usize,
    line_start: usize,
}

/// Character cursor with line/column bookkeeping for diagnostics.
#[derive(Debug)]
pub(crate) struct Cursor {
    input: String,
    /// Byte offset of the current position. Always on a UTF-8 boundary.
    offset: usize,
    /// 0-based line number of the current position.
    line: usize,
    /// Byte offset of the start of the current line.
    line_start: usize,
}

impl Cursor {
    pub fn new(input: String) -> Self {
        Self {
            input,
            offset: 0,
            line: 0,
            line_start: 0,
        }
    }

    fn char_at(&self, byte_offset: usize) -> char {
        self.input
            .get(byte_offset..)
            .and_then(|rest| rest.chars().next())
            .unwrap_or('\0')
    }

    /// The character at the current position, or `'\0'` at/past the sentinel.
    pub fn current(&self) -> char {
        self.char_at(self.offset)
    }

    /// Peek `n` characters ahead (0 = current character).
    pub fn peek(&self, n: usize) -> char {
        self.input
            .get(self.offset..)
            .and_then(|rest| rest.chars().nth(n))
            .unwrap_or('\0')
    }

    /// Consume the current character and return it.
    ///
    /// Line bookkeeping is updated here: `\n` and a lone `\r` both end a
    /// line, while the `\r` of a `\r\n` pair defers to the following `\n`.
    pub fn advance(&mut self) -> char {
        let ch = self.current();
        if ch == '\0' && self.offset >= self.input.len() {
            return '\0';
        }
        self.offset += ch.len_utf8();
        if ch == '\n' || (ch == '\r' && self.current() != '\n') {
            self.line += 1;
            self.line_start = self.offset;
        }
        ch
    }

    /// Byte offset of the current position.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// `true` once the cursor has consumed everything before the sentinel.
    pub fn at_end(&self) -> bool {
        self.offset >= self.input.len().saturating_sub(1)
    }

    /// `true` if the cursor sits at the first character of a line.
    pub fn at_line_start(&self) -> bool {
        self.offset == self.line_start
    }

    /// 0-based column of the current position, counted in characters.
    pub fn column(&self) -> usize {
        self.input
            .get(self.line_start..self.offset)
            .map_or(0, |prefix| prefix.chars().count())
    }

    /// Snapshot the cursor state for bounded backtracking.
    pub fn mark(&self) -> Mark {
        Mark {
            offset: self.offset,
            line: self.line,
            line_start: self.line_start,
        }
    }

    /// Restore a previously saved state.
    pub fn reset(&mut self, mark: Mark) {
        self.offset = mark.offset;
        self.line = mark.line;
        self.line_start = mark.line_start;
    }

    /// The current position as a diagnostic [`Position`].
    pub fn position(&self) -> Position {
        Position {
            offset: self.offset,
            line: self.line,
            column: self.column(),
        }
    }

    /// A slice of the source between two byte offsets.
    ///
    /// Offsets handed in by the loader always come from earlier cursor
    /// positions, so they sit on UTF-8 boundaries.
    pub fn slice(&self, start: usize, end: usize) -> &str {
        self.input.get(start..end).unwrap_or_default()
    }

    /// The source line containing the current position, for error excerpts.
    ///
    /// Trailing line breaks and the sentinel are stripped; very long lines
    /// are truncated.
    pub fn excerpt(&self) -> String {
        const MAX_LEN: usize = 72;
        let rest = self.input.get(self.line_start..).unwrap_or_default();
        let line: String = rest
            .chars()
            .take_while(|&ch| ch != '\n' && ch != '\r' && ch != '\0')
            .take(MAX_LEN)
            .collect();
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(text: &str) -> Cursor {
        let mut sanitized = text.to_owned();
        sanitized.push('\0');
        Cursor::new(sanitized)
    }

    #[test]
    fn test_peek_and_advance() {
        let mut cur = cursor("ab");
        assert_eq!(cur.current(), 'a');
        assert_eq!(cur.peek(1), 'b');
        assert_eq!(cur.peek(2), '\0');
        assert_eq!(cur.advance(), 'a');
        assert_eq!(cur.advance(), 'b');
        assert_eq!(cur.current(), '\0');
        assert!(cur.at_end());
    }

    #[test]
    fn test_reading_past_sentinel_is_stable() {
        let mut cur = cursor("");
        assert_eq!(cur.current(), '\0');
        assert_eq!(cur.advance(), '\0');
        assert_eq!(cur.advance(), '\0');
        assert_eq!(cur.current(), '\0');
    }

    #[test]
    fn test_line_and_column_tracking() {
        let mut cur = cursor("ab\ncd\r\nef");
        for _ in 0..3 {
            cur.advance();
        }
        assert_eq!(cur.position().line, 1);
        assert_eq!(cur.position().column, 0);
        assert!(cur.at_line_start());
        // consume "cd\r\n" - the \r\n pair counts as one break
        for _ in 0..4 {
            cur.advance();
        }
        assert_eq!(cur.position().line, 2);
        assert_eq!(cur.position().column, 0);
    }

    #[test]
    fn test_lone_carriage_return_ends_a_line() {
        let mut cur = cursor("a\rb");
        cur.advance();
        cur.advance();
        assert_eq!(cur.position().line, 1);
        assert_eq!(cur.current(), 'b');
    }

    #[test]
    fn test_mark_reset_round_trip() {
        let mut cur = cursor("one\ntwo");
        for _ in 0..5 {
            cur.advance();
        }
        let mark = cur.mark();
        for _ in 0..2 {
            cur.advance();
        }
        assert_eq!(cur.position().column, 3);
        cur.reset(mark);
        assert_eq!(cur.position().line, 1);
        assert_eq!(cur.position().column, 1);
        assert_eq!(cur.current(), 'w');
    }

    #[test]
    fn test_column_counts_characters_not_bytes() {
        let mut cur = cursor("é①x");
        cur.advance();
        cur.advance();
        assert_eq!(cur.position().column, 2);
    }

    #[test]
    fn test_excerpt_strips_terminators() {
        let mut cur = cursor("key: value\nnext");
        for _ in 0..4 {
            cur.advance();
        }
        assert_eq!(cur.excerpt(), "key: value");
    }
}
