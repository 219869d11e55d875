// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Scalar readers: plain, single-quoted, double-quoted and block scalars.
//!
//! Each reader returns the raw literal plus its source span; tag resolution
//! happens afterwards in `compose_node`. Multi-line scalars fold line breaks
//! the YAML way: a single break becomes a space, `n` consecutive breaks
//! become `n - 1` newlines.

use chumsky::span::Span as _;

use super::{is_eol, is_flow_indicator, is_white, is_ws_or_eol, Loader};
use crate::error::{ErrorKind, LoadError};
use crate::span::Span;

/// Characters that can never start a plain scalar.
fn blocks_plain_start(ch: char) -> bool {
    matches!(
        ch,
        '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@' | '`'
    )
}

fn write_folded_lines(result: &mut String, count: usize) {
    if count == 1 {
        result.push(' ');
    } else {
        for _ in 1..count {
            result.push('\n');
        }
    }
}

fn push_newlines(result: &mut String, count: usize) {
    for _ in 0..count {
        result.push('\n');
    }
}

/// How a block scalar treats its trailing line breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chomping {
    /// Keep a single trailing newline (the default).
    Clip,
    /// Drop all trailing newlines (`-`).
    Strip,
    /// Keep every trailing newline (`+`).
    Keep,
}

fn simple_escape(ch: char) -> Option<char> {
    Some(match ch {
        '0' => '\0',
        'a' => '\u{07}',
        'b' => '\u{08}',
        't' | '\t' => '\t',
        'n' => '\n',
        'v' => '\u{0B}',
        'f' => '\u{0C}',
        'r' => '\r',
        'e' => '\u{1B}',
        ' ' => ' ',
        '"' => '"',
        '/' => '/',
        '\\' => '\\',
        'N' => '\u{85}',
        '_' => '\u{A0}',
        'L' => '\u{2028}',
        'P' => '\u{2029}',
        _ => return None,
    })
}

fn escape_hex_len(ch: char) -> Option<u32> {
    match ch {
        'x' => Some(2),
        'u' => Some(4),
        'U' => Some(8),
        _ => None,
    }
}

impl Loader {
    /// Read a plain (unquoted) scalar.
    ///
    /// Termination is context dependent: `: ` and ` #` end the scalar
    /// everywhere, flow indicators end it inside flow collections, and a
    /// line indented less than `node_indent` ends it across lines.
    pub(super) fn read_plain_scalar(
        &mut self,
        node_indent: i64,
        within_flow: bool,
    ) -> Result<Option<(String, Span)>, LoadError> {
        let first = self.cursor.current();
        if is_ws_or_eol(first) || blocks_plain_start(first) || is_flow_indicator(first) {
            return Ok(None);
        }
        if matches!(first, '-' | '?' | ':') {
            let following = self.cursor.peek(1);
            if is_ws_or_eol(following) || (within_flow && is_flow_indicator(following)) {
                return Ok(None);
            }
        }

        let span_start = self.cursor.offset();
        let mut result = String::new();
        let mut capture_start = self.cursor.offset();
        let mut capture_end = self.cursor.offset();
        let mut has_pending_content = false;
        let mut fold_start_line = 0usize;
        let mut prev = '\0';

        loop {
            let ch = self.cursor.current();
            if ch == '\0' {
                break;
            }
            if ch == ':' {
                let following = self.cursor.peek(1);
                if is_ws_or_eol(following) || (within_flow && is_flow_indicator(following)) {
                    break;
                }
            } else if ch == '#' {
                // a comment starts only after whitespace
                if is_ws_or_eol(prev) {
                    break;
                }
            } else if (self.cursor.at_line_start() && self.test_document_separator())
                || (within_flow && is_flow_indicator(ch))
            {
                break;
            } else if is_eol(ch) {
                let saved = self.cursor.mark();
                let line_before = self.cursor.position().line;
                self.skip_separation_space(false, -1)?;
                if self.line_indent >= node_indent {
                    has_pending_content = true;
                    fold_start_line = line_before;
                    prev = ' ';
                    continue;
                }
                self.cursor.reset(saved);
                break;
            }
            if has_pending_content {
                result.push_str(self.cursor.slice(capture_start, capture_end));
                write_folded_lines(&mut result, self.cursor.position().line - fold_start_line);
                capture_start = self.cursor.offset();
                capture_end = self.cursor.offset();
                has_pending_content = false;
            }
            if !is_white(ch) {
                capture_end = self.cursor.offset() + ch.len_utf8();
            }
            prev = self.cursor.advance();
        }
        result.push_str(self.cursor.slice(capture_start, capture_end));
        if result.is_empty() {
            return Ok(None);
        }
        Ok(Some((result, Span::new((), span_start..capture_end))))
    }

    /// Read a single-quoted scalar. The only escape is `''` for a literal
    /// quote.
    pub(super) fn read_single_quoted_scalar(
        &mut self,
    ) -> Result<Option<(String, Span)>, LoadError> {
        if self.cursor.current() != '\'' {
            return Ok(None);
        }
        let span_start = self.cursor.offset();
        self.cursor.advance();
        let mut result = String::new();
        let mut capture_start = self.cursor.offset();
        let mut capture_end = self.cursor.offset();
        loop {
            let ch = self.cursor.current();
            if ch == '\0' {
                break;
            }
            if ch == '\'' {
                result.push_str(self.cursor.slice(capture_start, capture_end));
                self.cursor.advance();
                if self.cursor.current() == '\'' {
                    capture_start = self.cursor.offset();
                    self.cursor.advance();
                    capture_end = self.cursor.offset();
                } else {
                    let span = Span::new((), span_start..self.cursor.offset());
                    return Ok(Some((result, span)));
                }
            } else if is_eol(ch) {
                result.push_str(self.cursor.slice(capture_start, capture_end));
                let breaks = self.skip_separation_space(false, -1)?;
                write_folded_lines(&mut result, breaks);
                capture_start = self.cursor.offset();
                capture_end = self.cursor.offset();
            } else if self.cursor.at_line_start() && self.test_document_separator() {
                return Err(
                    self.syntax("unexpected end of the document within a single quoted scalar")
                );
            } else {
                self.cursor.advance();
                capture_end = self.cursor.offset();
            }
        }
        Err(self.error(ErrorKind::UnterminatedQuotedString {
            double_quoted: false,
        }))
    }

    /// Read a double-quoted scalar with the full escape set, including
    /// `\xXX`, `\uXXXX`, `\UXXXXXXXX` and escaped line breaks.
    pub(super) fn read_double_quoted_scalar(
        &mut self,
    ) -> Result<Option<(String, Span)>, LoadError> {
        if self.cursor.current() != '"' {
            return Ok(None);
        }
        let span_start = self.cursor.offset();
        self.cursor.advance();
        let mut result = String::new();
        let mut capture_start = self.cursor.offset();
        let mut capture_end = self.cursor.offset();
        loop {
            let ch = self.cursor.current();
            if ch == '\0' {
                break;
            }
            if ch == '"' {
                result.push_str(self.cursor.slice(capture_start, capture_end));
                self.cursor.advance();
                let span = Span::new((), span_start..self.cursor.offset());
                return Ok(Some((result, span)));
            }
            if ch == '\\' {
                result.push_str(self.cursor.slice(capture_start, capture_end));
                self.cursor.advance();
                let escaped = self.cursor.current();
                if is_eol(escaped) {
                    // an escaped line break joins the lines without folding
                    self.skip_separation_space(false, -1)?;
                } else if let Some(decoded) = simple_escape(escaped) {
                    result.push(decoded);
                    self.cursor.advance();
                } else if let Some(hex_len) = escape_hex_len(escaped) {
                    self.cursor.advance();
                    let mut code: u32 = 0;
                    for _ in 0..hex_len {
                        let Some(digit) = self.cursor.current().to_digit(16) else {
                            return Err(self.syntax("expected hexadecimal character"));
                        };
                        code = code * 16 + digit;
                        self.cursor.advance();
                    }
                    let Some(decoded) = char::from_u32(code) else {
                        return Err(self.syntax(format!(
                            "invalid Unicode code point {code:#x} in an escape sequence"
                        )));
                    };
                    result.push(decoded);
                } else {
                    return Err(self.error(ErrorKind::InvalidEscape(escaped)));
                }
                capture_start = self.cursor.offset();
                capture_end = self.cursor.offset();
            } else if is_eol(ch) {
                result.push_str(self.cursor.slice(capture_start, capture_end));
                let breaks = self.skip_separation_space(false, -1)?;
                write_folded_lines(&mut result, breaks);
                capture_start = self.cursor.offset();
                capture_end = self.cursor.offset();
            } else if self.cursor.at_line_start() && self.test_document_separator() {
                return Err(
                    self.syntax("unexpected end of the document within a double quoted scalar")
                );
            } else {
                self.cursor.advance();
                capture_end = self.cursor.offset();
            }
        }
        Err(self.error(ErrorKind::UnterminatedQuotedString { double_quoted: true }))
    }

    /// Read a block scalar (`|` literal or `>` folded), including the
    /// optional explicit-indent digit and chomping indicator.
    pub(super) fn read_block_scalar(
        &mut self,
        node_indent: i64,
    ) -> Result<Option<(String, Span)>, LoadError> {
        let folding = match self.cursor.current() {
            '|' => false,
            '>' => true,
            _ => return Ok(None),
        };
        let span_start = self.cursor.offset();
        self.cursor.advance();

        let mut chomping = Chomping::Clip;
        let mut chomping_set = false;
        let mut detected_indent = false;
        let mut text_indent = node_indent;
        loop {
            let ch = self.cursor.current();
            if ch == '+' || ch == '-' {
                if chomping_set {
                    return Err(self.syntax("repeat of a chomping mode identifier"));
                }
                chomping = if ch == '+' {
                    Chomping::Keep
                } else {
                    Chomping::Strip
                };
                chomping_set = true;
                self.cursor.advance();
            } else if let Some(width) = ch.to_digit(10) {
                if width == 0 {
                    return Err(self.syntax(
                        "bad explicit indentation width of a block scalar; it cannot be less than one",
                    ));
                }
                if detected_indent {
                    return Err(self.syntax("repeat of an indentation width identifier"));
                }
                text_indent = node_indent + i64::from(width) - 1;
                detected_indent = true;
                self.cursor.advance();
            } else {
                break;
            }
        }
        if is_white(self.cursor.current()) {
            while is_white(self.cursor.current()) {
                self.cursor.advance();
            }
            if self.cursor.current() == '#' {
                while !is_eol(self.cursor.current()) && self.cursor.current() != '\0' {
                    self.cursor.advance();
                }
            }
        }

        let mut result = String::new();
        let mut did_read_content = false;
        let mut empty_lines = 0usize;
        let mut at_more_indented = false;
        while self.cursor.current() != '\0' {
            self.read_line_break()?;
            self.line_indent = 0;
            while (!detected_indent || self.line_indent < text_indent)
                && self.cursor.current() == ' '
            {
                self.line_indent += 1;
                self.cursor.advance();
            }
            if !detected_indent && self.line_indent > text_indent {
                text_indent = self.line_indent;
            }
            if is_eol(self.cursor.current()) {
                empty_lines += 1;
                continue;
            }
            if self.line_indent < text_indent {
                match chomping {
                    Chomping::Keep => {
                        let trailing = if did_read_content {
                            empty_lines + 1
                        } else {
                            empty_lines
                        };
                        push_newlines(&mut result, trailing);
                    }
                    Chomping::Clip => {
                        if did_read_content {
                            result.push('\n');
                        }
                    }
                    Chomping::Strip => {}
                }
                break;
            }

            if folding {
                if is_white(self.cursor.current()) {
                    // a more-indented line keeps its breaks literal
                    at_more_indented = true;
                    let breaks = if did_read_content {
                        empty_lines + 1
                    } else {
                        empty_lines
                    };
                    push_newlines(&mut result, breaks);
                } else if at_more_indented {
                    at_more_indented = false;
                    push_newlines(&mut result, empty_lines + 1);
                } else if empty_lines == 0 {
                    if did_read_content {
                        result.push(' ');
                    }
                } else {
                    push_newlines(&mut result, empty_lines);
                }
            } else {
                let breaks = if did_read_content {
                    empty_lines + 1
                } else {
                    empty_lines
                };
                push_newlines(&mut result, breaks);
            }
            did_read_content = true;
            detected_indent = true;
            empty_lines = 0;
            let capture_start = self.cursor.offset();
            while !is_eol(self.cursor.current()) && self.cursor.current() != '\0' {
                self.cursor.advance();
            }
            result.push_str(self.cursor.slice(capture_start, self.cursor.offset()));
        }
        Ok(Some((
            result,
            Span::new((), span_start..self.cursor.offset()),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaKind;

    fn loader(text: &str) -> Loader {
        let mut sanitized = text.to_owned();
        if !sanitized.is_empty() && !sanitized.ends_with(['\n', '\r']) {
            sanitized.push('\n');
        }
        sanitized.push('\0');
        Loader::new(sanitized, SchemaKind::Default, false, None)
    }

    fn plain(text: &str) -> Option<String> {
        loader(text)
            .read_plain_scalar(0, false)
            .unwrap()
            .map(|(s, _)| s)
    }

    #[test]
    fn test_plain_scalar_folding() {
        assert_eq!(plain("first\n  second"), Some("first second".to_owned()));
        // an empty line becomes a literal newline
        assert_eq!(
            plain("first\n  second\n\n  third"),
            Some("first second\nthird".to_owned())
        );
    }

    #[test]
    fn test_plain_scalar_terminators() {
        let mut state = loader("key: value");
        let (literal, _) = state.read_plain_scalar(0, false).unwrap().unwrap();
        assert_eq!(literal, "key");
        assert_eq!(state.cursor.current(), ':');

        // a colon not followed by whitespace is content
        assert_eq!(plain("a:b"), Some("a:b".to_owned()));
        // '#' is a comment only after whitespace
        assert_eq!(plain("a#b # comment"), Some("a#b".to_owned()));
    }

    #[test]
    fn test_plain_scalar_flow_context() {
        let mut state = loader("a, b]");
        let (literal, _) = state.read_plain_scalar(0, true).unwrap().unwrap();
        assert_eq!(literal, "a");
        // outside flow context the comma is content
        assert_eq!(plain("a, b]"), Some("a, b]".to_owned()));
    }

    #[test]
    fn test_single_quoted_escape() {
        let mut state = loader("'it''s'");
        let (literal, _) = state.read_single_quoted_scalar().unwrap().unwrap();
        assert_eq!(literal, "it's");
    }

    #[test]
    fn test_single_quoted_unterminated() {
        let err = loader("'open").read_single_quoted_scalar().unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::UnterminatedQuotedString {
                double_quoted: false
            }
        );
    }

    #[test]
    fn test_double_quoted_escapes() {
        let mut state = loader(r#""a\nb\x41B\\""#);
        let (literal, _) = state.read_double_quoted_scalar().unwrap().unwrap();
        assert_eq!(literal, "a\nbAB\\");
    }

    #[test]
    fn test_double_quoted_line_continuation() {
        let mut state = loader("\"one\\\n  two\"");
        let (literal, _) = state.read_double_quoted_scalar().unwrap().unwrap();
        assert_eq!(literal, "onetwo");
    }

    #[test]
    fn test_double_quoted_folding() {
        let mut state = loader("\"one\n  two\"");
        let (literal, _) = state.read_double_quoted_scalar().unwrap().unwrap();
        assert_eq!(literal, "one two");
    }

    #[test]
    fn test_double_quoted_invalid_escape() {
        let err = loader(r#""\q""#).read_double_quoted_scalar().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidEscape('q'));
    }

    fn block(text: &str) -> Result<String, LoadError> {
        loader(text)
            .read_block_scalar(0)
            .map(|scalar| scalar.map(|(s, _)| s).unwrap_or_default())
    }

    #[test]
    fn test_block_literal_chomping() {
        assert_eq!(block("|\n  a\n  b\n").unwrap(), "a\nb\n");
        assert_eq!(block("|-\n  a\n  b\n").unwrap(), "a\nb");
        assert_eq!(block("|+\n  a\n\n").unwrap(), "a\n\n");
    }

    #[test]
    fn test_folded_scalar() {
        assert_eq!(block(">\n  one\n  two\n").unwrap(), "one two\n");
        // an empty line forces a real newline
        assert_eq!(block(">\n  one\n\n  two\n").unwrap(), "one\ntwo\n");
        // more-indented lines are not folded
        assert_eq!(block(">\n  one\n    lit\n  two\n").unwrap(), "one\n  lit\ntwo\n");
    }

    #[test]
    fn test_block_scalar_explicit_indent() {
        // width 2 relative to a parent indent of 0 fixes the text indent at 1
        assert_eq!(block("|2\n   a\n").unwrap(), "  a\n");
    }

    #[test]
    fn test_block_scalar_header_errors() {
        assert!(block("|--\n  a\n").is_err());
        assert!(block("|0\n  a\n").is_err());
        assert!(block("|22\n  a\n").is_err());
    }
}
