// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Flow collections: `[...]` sequences and `{...}` mappings.
//!
//! Flow collections are delimiter-based and ignore indentation. A `?`-marked
//! or `key: value` pair inside a flow sequence becomes a single-pair mapping
//! item, as in `[a: 1, b: 2]`.

use chumsky::span::Span as _;

use super::{is_ws_or_eol, Context, Loader};
use crate::error::LoadError;
use crate::span::Span;
use crate::value::{NodeId, Value};

impl Loader {
    pub(super) fn read_flow_collection(
        &mut self,
        node_indent: i64,
        anchor: Option<&str>,
    ) -> Result<Option<NodeId>, LoadError> {
        let (terminator, is_mapping) = match self.cursor.current() {
            '[' => (']', false),
            '{' => ('}', true),
            _ => return Ok(None),
        };
        let span_start = self.cursor.offset();
        let empty = if is_mapping {
            Value::Mapping(Vec::new())
        } else {
            Value::Sequence(Vec::new())
        };
        let placeholder = self.begin_collection(anchor, empty);
        self.cursor.advance();

        let mut items: Vec<NodeId> = Vec::new();
        let mut entries: Vec<(NodeId, NodeId)> = Vec::new();
        let mut overridable: Vec<bool> = Vec::new();
        let mut read_next = true;

        while self.cursor.current() != '\0' {
            self.skip_separation_space(true, node_indent)?;
            if self.cursor.current() == terminator {
                self.cursor.advance();
                let span = Span::new((), span_start..self.cursor.offset());
                let value = if is_mapping {
                    Value::Mapping(entries)
                } else {
                    Value::Sequence(items)
                };
                return Ok(Some(self.finish_collection(placeholder, value, span)));
            }
            if !read_next {
                return Err(self.syntax("missed comma between flow collection entries"));
            }

            let mut is_pair = false;
            let mut is_explicit_pair = false;
            if self.cursor.current() == '?' && is_ws_or_eol(self.cursor.peek(1)) {
                is_pair = true;
                is_explicit_pair = true;
                self.cursor.advance();
                self.skip_separation_space(true, node_indent)?;
            }

            let entry_line = self.cursor.position().line;
            let pair_start = self.cursor.position();
            let key = self.compose_node(node_indent, Context::FlowIn, false, false)?;
            let key_merge = self.result_merge;
            let key = match key {
                Some(id) => id,
                None => self.null_node(),
            };
            self.skip_separation_space(true, node_indent)?;

            let mut value: Option<NodeId> = None;
            if (is_explicit_pair || self.cursor.position().line == entry_line)
                && self.cursor.current() == ':'
            {
                is_pair = true;
                self.cursor.advance();
                self.skip_separation_space(true, node_indent)?;
                value = self.compose_node(node_indent, Context::FlowIn, false, true)?;
            }

            if is_mapping {
                let value = match value {
                    Some(id) => id,
                    None => self.null_node(),
                };
                self.store_mapping_pair(
                    &mut entries,
                    &mut overridable,
                    key,
                    value,
                    key_merge,
                    pair_start,
                )?;
            } else if is_pair {
                // a pair inside a flow sequence becomes a single-pair mapping
                let value = match value {
                    Some(id) => id,
                    None => self.null_node(),
                };
                let mut pair_entries = Vec::new();
                let mut pair_overridable = Vec::new();
                self.store_mapping_pair(
                    &mut pair_entries,
                    &mut pair_overridable,
                    key,
                    value,
                    key_merge,
                    pair_start,
                )?;
                let span = Span::new((), pair_start.offset..self.cursor.offset());
                let id = self.alloc(Value::Mapping(pair_entries), span);
                items.push(id);
            } else {
                items.push(key);
            }

            self.skip_separation_space(true, node_indent)?;
            if self.cursor.current() == ',' {
                read_next = true;
                self.cursor.advance();
            } else {
                read_next = false;
            }
        }
        Err(self.syntax("unexpected end of the stream within a flow collection"))
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::SchemaKind;
    use crate::value::Document;

    use super::Loader;

    fn parse(text: &str) -> Document {
        let mut sanitized = text.to_owned();
        if !sanitized.is_empty() && !sanitized.ends_with(['\n', '\r']) {
            sanitized.push('\n');
        }
        sanitized.push('\0');
        Loader::new(sanitized, SchemaKind::Default, false, None)
            .read_document()
            .unwrap()
    }

    fn parse_err(text: &str) -> crate::error::LoadError {
        let mut sanitized = text.to_owned();
        if !sanitized.ends_with(['\n', '\r']) {
            sanitized.push('\n');
        }
        sanitized.push('\0');
        Loader::new(sanitized, SchemaKind::Default, false, None)
            .read_document()
            .unwrap_err()
    }

    #[test]
    fn test_flow_sequence() {
        let doc = parse("[1, two, 3.5, null]");
        let root = doc.root();
        assert_eq!(root.len(), 4);
        assert_eq!(root.item(0).and_then(|n| n.as_int()), Some(1));
        assert_eq!(root.item(1).and_then(|n| n.as_str()), Some("two"));
        assert_eq!(root.item(2).and_then(|n| n.as_float()), Some(3.5));
        assert!(root.item(3).unwrap().is_null());
    }

    #[test]
    fn test_flow_mapping() {
        let doc = parse("{a: 1, b: [2, 3], c}");
        let root = doc.root();
        assert_eq!(root.len(), 3);
        assert_eq!(root.get("a").and_then(|n| n.as_int()), Some(1));
        assert_eq!(root.get("b").map(|n| n.len()), Some(2));
        // a key without a value maps to null
        assert!(root.get("c").unwrap().is_null());
    }

    #[test]
    fn test_flow_collections_span_lines() {
        let doc = parse("[1,\n 2,\n 3]");
        assert_eq!(doc.root().len(), 3);
    }

    #[test]
    fn test_empty_flow_collections() {
        assert_eq!(parse("[]").root().len(), 0);
        assert_eq!(parse("{}").root().len(), 0);
    }

    #[test]
    fn test_pair_inside_flow_sequence() {
        let doc = parse("[a: 1, plain]");
        let root = doc.root();
        assert_eq!(root.len(), 2);
        let pair = root.item(0).unwrap();
        assert_eq!(pair.len(), 1);
        assert_eq!(pair.get("a").and_then(|n| n.as_int()), Some(1));
        assert_eq!(root.item(1).and_then(|n| n.as_str()), Some("plain"));
    }

    #[test]
    fn test_explicit_pair_with_null_key() {
        let doc = parse("{? : empty}");
        let (key, value) = doc.root().entries().next().unwrap();
        assert!(key.is_null());
        assert_eq!(value.as_str(), Some("empty"));
    }

    #[test]
    fn test_missed_comma_is_an_error() {
        let err = parse_err("[[1] [2]]");
        assert!(err.to_string().contains("missed comma"));
    }

    #[test]
    fn test_plain_scalar_absorbs_inner_spaces() {
        // without a comma the two tokens are one plain scalar
        let doc = parse("[1 2]");
        assert_eq!(doc.root().len(), 1);
        assert_eq!(doc.root().item(0).and_then(|n| n.as_str()), Some("1 2"));
    }

    #[test]
    fn test_unterminated_flow_collection() {
        let err = parse_err("[1, 2");
        assert!(
            err.to_string()
                .contains("unexpected end of the stream within a flow collection")
        );
    }
}
