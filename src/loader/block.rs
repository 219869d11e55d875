// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Block (indentation-delimited) collections.

use chumsky::span::Span as _;

use super::{is_white, is_ws_or_eol, Context, Loader};
use crate::error::{ErrorKind, LoadError};
use crate::span::Span;
use crate::value::{NodeId, Value};

impl Loader {
    /// Read a block sequence (`- item` entries at `node_indent`).
    pub(super) fn read_block_sequence(
        &mut self,
        node_indent: i64,
        anchor: Option<&str>,
    ) -> Result<Option<NodeId>, LoadError> {
        let span_start = self.cursor.offset();
        let placeholder = self.begin_collection(anchor, Value::Sequence(Vec::new()));
        let mut items: Vec<NodeId> = Vec::new();
        let mut detected = false;

        loop {
            if self.cursor.current() != '-' || !is_ws_or_eol(self.cursor.peek(1)) {
                break;
            }
            detected = true;
            self.cursor.advance();

            if self.skip_separation_space(true, -1)? > 0 && self.line_indent <= node_indent {
                // "-" on its own line at this indent is an empty entry
                let id = self.null_node();
                items.push(id);
                continue;
            }

            let entry_line = self.cursor.position().line;
            let id = match self.compose_node(node_indent, Context::BlockIn, false, true)? {
                Some(id) => id,
                None => self.null_node(),
            };
            items.push(id);
            self.skip_separation_space(true, -1)?;

            if (self.cursor.position().line == entry_line || self.line_indent > node_indent)
                && self.cursor.current() != '\0'
            {
                return Err(self.error(ErrorKind::BadIndentation("a sequence entry")));
            }
            if self.line_indent < node_indent {
                break;
            }
        }

        if !detected {
            return Ok(None);
        }
        let span = Span::new((), span_start..self.cursor.offset());
        Ok(Some(self.finish_collection(placeholder, Value::Sequence(items), span)))
    }

    /// Read a block mapping.
    ///
    /// Also handles the case where the candidate key turns out not to be
    /// followed by a colon: the composed node is then returned as-is (this
    /// is how a top-level plain scalar is reached).
    pub(super) fn read_block_mapping(
        &mut self,
        node_indent: i64,
        flow_indent: i64,
        anchor: Option<&str>,
    ) -> Result<Option<NodeId>, LoadError> {
        let span_start = self.cursor.offset();
        let placeholder = self.begin_collection(anchor, Value::Mapping(Vec::new()));
        let mut entries: Vec<(NodeId, NodeId)> = Vec::new();
        let mut overridable: Vec<bool> = Vec::new();
        let mut detected = false;
        let mut at_explicit_key = false;
        let mut allow_compact = false;
        // the key of the pair being read, plus its merge-key flag
        let mut pending_key: Option<(NodeId, bool)> = None;

        while self.cursor.current() != '\0' {
            let ch = self.cursor.current();
            let following = self.cursor.peek(1);
            let entry_line = self.cursor.position().line;
            let pair_start = self.cursor.position();

            if (ch == '?' || ch == ':') && is_ws_or_eol(following) {
                if ch == '?' {
                    if at_explicit_key {
                        // the previous explicit key had no value
                        let (key, merge) = match pending_key.take() {
                            Some(pair) => pair,
                            None => (self.null_node(), false),
                        };
                        let value = self.null_node();
                        self.store_mapping_pair(
                            &mut entries,
                            &mut overridable,
                            key,
                            value,
                            merge,
                            pair_start,
                        )?;
                    }
                    detected = true;
                    at_explicit_key = true;
                    allow_compact = true;
                } else if at_explicit_key {
                    at_explicit_key = false;
                    allow_compact = true;
                } else {
                    return Err(self.syntax(
                        "incomplete explicit mapping pair; a key node is missed; \
                         or followed by a non-tabulated empty line",
                    ));
                }
                self.cursor.advance();
            } else {
                match self.compose_node(flow_indent, Context::FlowOut, false, true)? {
                    Some(key_id) => {
                        let key_merge = self.result_merge;
                        if self.cursor.position().line == entry_line {
                            while is_white(self.cursor.current()) {
                                self.cursor.advance();
                            }
                            if self.cursor.current() == ':' {
                                self.cursor.advance();
                                if !is_ws_or_eol(self.cursor.current()) {
                                    return Err(self.syntax(
                                        "a whitespace character is expected after the \
                                         key-value separator within a block mapping",
                                    ));
                                }
                                if at_explicit_key {
                                    let (key, merge) = match pending_key.take() {
                                        Some(pair) => pair,
                                        None => (self.null_node(), false),
                                    };
                                    let value = self.null_node();
                                    self.store_mapping_pair(
                                        &mut entries,
                                        &mut overridable,
                                        key,
                                        value,
                                        merge,
                                        pair_start,
                                    )?;
                                }
                                detected = true;
                                at_explicit_key = false;
                                allow_compact = false;
                                pending_key = Some((key_id, key_merge));
                            } else if detected {
                                return Err(self.syntax(
                                    "can not read an implicit mapping pair; a colon is missed",
                                ));
                            } else {
                                // not a mapping after all
                                return Ok(Some(key_id));
                            }
                        } else if detected {
                            return Err(self.syntax(
                                "can not read a block mapping entry; \
                                 a multiline key may not be an implicit key",
                            ));
                        } else {
                            return Ok(Some(key_id));
                        }
                    }
                    None => break,
                }
            }

            if self.cursor.position().line == entry_line || self.line_indent > node_indent {
                let value = self.compose_node(node_indent, Context::BlockOut, true, allow_compact)?;
                if at_explicit_key {
                    // in explicit mode this section composes the key itself
                    if let Some(id) = value {
                        pending_key = Some((id, false));
                    }
                } else {
                    let value_id = match value {
                        Some(id) => id,
                        None => self.null_node(),
                    };
                    let (key, merge) = match pending_key.take() {
                        Some(pair) => pair,
                        None => (self.null_node(), false),
                    };
                    self.store_mapping_pair(
                        &mut entries,
                        &mut overridable,
                        key,
                        value_id,
                        merge,
                        pair_start,
                    )?;
                }
                self.skip_separation_space(true, -1)?;
            }

            if self.line_indent > node_indent && self.cursor.current() != '\0' {
                return Err(self.error(ErrorKind::BadIndentation("a mapping entry")));
            }
            if self.line_indent < node_indent {
                break;
            }
        }

        if at_explicit_key {
            let (key, merge) = match pending_key.take() {
                Some(pair) => pair,
                None => (self.null_node(), false),
            };
            let value = self.null_node();
            let at = self.cursor.position();
            self.store_mapping_pair(&mut entries, &mut overridable, key, value, merge, at)?;
        }

        if !detected {
            return Ok(None);
        }
        let span = Span::new((), span_start..self.cursor.offset());
        Ok(Some(self.finish_collection(placeholder, Value::Mapping(entries), span)))
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::SchemaKind;
    use crate::value::{Document, Value};

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

    #[test]
    fn test_block_sequence() {
        let doc = parse("- 1\n- 2\n- 3");
        let root = doc.root();
        assert_eq!(root.len(), 3);
        assert_eq!(root.item(2).and_then(|n| n.as_int()), Some(3));
    }

    #[test]
    fn test_block_sequence_empty_entries() {
        let doc = parse("-\n- x\n-");
        let root = doc.root();
        assert_eq!(root.len(), 3);
        assert!(root.item(0).unwrap().is_null());
        assert_eq!(root.item(1).and_then(|n| n.as_str()), Some("x"));
        assert!(root.item(2).unwrap().is_null());
    }

    #[test]
    fn test_nested_block_collections() {
        let doc = parse("outer:\n  - a: 1\n    b: 2\n  - c: 3");
        let outer = doc.root().get("outer").unwrap();
        assert_eq!(outer.len(), 2);
        assert_eq!(
            outer.item(0).and_then(|m| m.get("b")).and_then(|n| n.as_int()),
            Some(2)
        );
    }

    #[test]
    fn test_compact_sequence_entry() {
        // a mapping starting on the same line as the dash
        let doc = parse("- key: value\n  other: 2");
        let first = doc.root().item(0).unwrap();
        assert_eq!(first.get("key").and_then(|n| n.as_str()), Some("value"));
        assert_eq!(first.get("other").and_then(|n| n.as_int()), Some(2));
    }

    #[test]
    fn test_explicit_complex_key() {
        let doc = parse("? [a, b]\n: pair");
        let root = doc.root();
        assert_eq!(root.len(), 1);
        let (key, value) = root.entries().next().unwrap();
        assert!(matches!(key.value(), Value::Sequence(_)));
        assert_eq!(value.as_str(), Some("pair"));
    }

    #[test]
    fn test_explicit_key_without_value() {
        let doc = parse("? lonely");
        let (key, value) = doc.root().entries().next().unwrap();
        assert_eq!(key.as_str(), Some("lonely"));
        assert!(value.is_null());
    }

    #[test]
    fn test_empty_value_resolves_to_null() {
        let doc = parse("key:\nother: 1");
        let root = doc.root();
        assert_eq!(root.len(), 2);
        assert!(root.get("key").unwrap().is_null());
        assert_eq!(root.get("other").and_then(|n| n.as_int()), Some(1));
    }

    #[test]
    fn test_sequence_at_parent_indent() {
        // a block sequence may sit at the same indent as its mapping key
        let doc = parse("items:\n- 1\n- 2\nnext: 3");
        let root = doc.root();
        assert_eq!(root.get("items").map(|n| n.len()), Some(2));
        assert_eq!(root.get("next").and_then(|n| n.as_int()), Some(3));
    }

    #[test]
    fn test_top_level_plain_scalar_via_mapping_reader() {
        let doc = parse("just a scalar");
        assert_eq!(doc.root().as_str(), Some("just a scalar"));
    }

    #[test]
    fn test_multiline_implicit_key_is_rejected() {
        let mut sanitized = "a: 1\nmulti\n  line: 2\n".to_owned();
        sanitized.push('\0');
        let err = Loader::new(sanitized, SchemaKind::Default, false, None)
            .read_document()
            .unwrap_err();
        assert!(err.to_string().contains("multiline key"));
    }
}
