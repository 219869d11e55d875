// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! The loader: composes resolved nodes from the character stream.
//!
//! One [`Loader::read_document`] call produces one [`Document`]. Composition
//! is recursive descent over the indentation-sensitive grammar; the current
//! [`Context`] decides which constructs are legal (block collections are not
//! allowed inside flow collections, plain scalars terminate on flow
//! indicators inside them, and so on). Indentation is threaded through as a
//! `parent_indent` parameter rather than an explicit stack: a line indented
//! less than the minimum simply fails the reader and closes the enclosing
//! collection.
//!
//! Anchors bind before a collection's children are composed, so aliases may
//! legally point at an ancestor still under construction.

mod block;
mod flow;
mod scalar;

use std::collections::{HashMap, HashSet};

use chumsky::span::Span as _;

use crate::cursor::Cursor;
use crate::error::{ErrorKind, LoadError, Warning};
use crate::schema::{expand_secondary_handle, Schema, SchemaKind};
use crate::span::{Position, Span};
use crate::value::{structural_eq, Document, NodeId, NodeKind, Value};

const MERGE_TAG: &str = "tag:yaml.org,2002:merge";

pub(crate) fn is_eol(ch: char) -> bool {
    matches!(ch, '\n' | '\r')
}

pub(crate) fn is_white(ch: char) -> bool {
    matches!(ch, ' ' | '\t')
}

pub(crate) fn is_ws_or_eol(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\0')
}

pub(crate) fn is_flow_indicator(ch: char) -> bool {
    matches!(ch, ',' | '[' | ']' | '{' | '}')
}

fn is_tag_uri_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || "-;/?:@&=+$,_.!~*'()[]%".contains(ch)
}

fn is_valid_tag_handle(handle: &str) -> bool {
    if handle == "!" || handle == "!!" {
        return true;
    }
    handle.len() > 2
        && handle.starts_with('!')
        && handle.ends_with('!')
        && handle
            .get(1..handle.len() - 1)
            .is_some_and(|inner| inner.chars().all(|ch| ch.is_ascii_alphabetic() || ch == '-'))
}

/// Where in the grammar a node is being composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Context {
    /// Between documents or between block mapping entries.
    BlockOut,
    /// Inside a block sequence entry.
    BlockIn,
    /// A value position outside any flow collection.
    FlowOut,
    /// Inside a flow collection.
    FlowIn,
}

impl Context {
    fn in_flow(self) -> bool {
        matches!(self, Self::FlowOut | Self::FlowIn)
    }
}

/// A tag property attached to the node under composition.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingTag {
    /// The `!` non-specific tag: suppress resolution, keep the string.
    NonSpecific,
    /// A fully expanded tag name.
    Explicit(String),
}

/// What a composition attempt produced before tag resolution.
enum Composed {
    /// No content at this position.
    None,
    /// A raw scalar literal awaiting resolution.
    Scalar {
        literal: String,
        span: Span,
        plain: bool,
    },
    /// An already-allocated node (collection or alias target).
    Node(NodeId),
}

fn indent_cmp(line_indent: i64, parent_indent: i64) -> i8 {
    match line_indent.cmp(&parent_indent) {
        std::cmp::Ordering::Greater => 1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Less => -1,
    }
}

pub(crate) struct Loader {
    cursor: Cursor,
    schema: &'static Schema,
    allow_duplicate_keys: bool,
    on_warning: Option<Box<dyn FnMut(Warning)>>,

    // Arena for the document under construction.
    nodes: Vec<Value>,
    spans: Vec<Span>,

    // Per-document state, cleared at each document boundary.
    anchors: HashMap<String, NodeId>,
    tag_handles: HashMap<String, String>,
    version: Option<(u32, u32)>,
    check_line_breaks: bool,

    /// Indentation (spaces) of the current line, maintained by
    /// [`Loader::skip_separation_space`] and the block scalar reader.
    line_indent: i64,

    // Properties pending for the node currently being composed.
    tag: Option<PendingTag>,
    anchor: Option<String>,

    /// Set when the last composed node resolved through the merge-key rule.
    result_merge: bool,
}

impl Loader {
    pub fn new(
        sanitized: String,
        schema: SchemaKind,
        allow_duplicate_keys: bool,
        on_warning: Option<Box<dyn FnMut(Warning)>>,
    ) -> Self {
        Self {
            cursor: Cursor::new(sanitized),
            schema: schema.registry(),
            allow_duplicate_keys,
            on_warning,
            nodes: Vec::new(),
            spans: Vec::new(),
            anchors: HashMap::new(),
            tag_handles: HashMap::new(),
            version: None,
            check_line_breaks: false,
            line_indent: 0,
            tag: None,
            anchor: None,
            result_merge: false,
        }
    }

    pub fn at_end(&self) -> bool {
        self.cursor.at_end()
    }

    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    // ---- arena helpers ----

    fn alloc(&mut self, value: Value, span: Span) -> NodeId {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "node counts are bounded by the input length"
        )]
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(value);
        self.spans.push(span);
        id
    }

    fn set_node(&mut self, id: NodeId, value: Value, span: Span) {
        if let Some(slot) = self.nodes.get_mut(id.index()) {
            *slot = value;
        }
        if let Some(slot) = self.spans.get_mut(id.index()) {
            *slot = span;
        }
    }

    /// A fresh null node with a zero-width span at the cursor. Used for
    /// empty keys, empty values and empty sequence entries.
    fn null_node(&mut self) -> NodeId {
        let here = self.cursor.offset();
        self.alloc(Value::Null, Span::new((), here..here))
    }

    fn node_kind(&self, id: NodeId) -> NodeKind {
        self.nodes.get(id.index()).map_or(NodeKind::Scalar, Value::kind)
    }

    /// Allocate the placeholder for an anchored collection so that aliases
    /// inside the collection can already refer to it.
    fn begin_collection(&mut self, anchor: Option<&str>, empty: Value) -> Option<NodeId> {
        anchor.map(|name| {
            let here = self.cursor.offset();
            let id = self.alloc(empty, Span::new((), here..here));
            self.anchors.insert(name.to_owned(), id);
            id
        })
    }

    /// Store a finished collection, reusing the anchored placeholder if one
    /// was allocated.
    fn finish_collection(&mut self, placeholder: Option<NodeId>, value: Value, span: Span) -> NodeId {
        match placeholder {
            Some(id) => {
                self.set_node(id, value, span);
                id
            }
            None => self.alloc(value, span),
        }
    }

    // ---- diagnostics ----

    fn error(&self, kind: ErrorKind) -> LoadError {
        LoadError::new(kind, self.cursor.position()).with_excerpt(self.cursor.excerpt())
    }

    fn error_at(&self, kind: ErrorKind, position: Position) -> LoadError {
        LoadError::new(kind, position).with_excerpt(self.cursor.excerpt())
    }

    fn syntax(&self, message: impl Into<String>) -> LoadError {
        self.error(ErrorKind::Syntax(message.into()))
    }

    fn warn(&mut self, message: impl Into<String>) {
        let position = self.cursor.position();
        if let Some(sink) = self.on_warning.as_mut() {
            sink(Warning {
                message: message.into(),
                position,
            });
        }
    }

    // ---- low-level scanning ----

    fn read_line_break(&mut self) -> Result<(), LoadError> {
        match self.cursor.current() {
            '\n' => {
                self.cursor.advance();
            }
            '\r' => {
                self.cursor.advance();
                if self.cursor.current() == '\n' {
                    self.cursor.advance();
                }
            }
            _ => return Err(self.syntax("a line break is expected")),
        }
        Ok(())
    }

    /// Skip whitespace, comments and line breaks between tokens. Returns the
    /// number of line breaks crossed and leaves `line_indent` describing the
    /// line the cursor ends on.
    fn skip_separation_space(
        &mut self,
        allow_comments: bool,
        check_indent: i64,
    ) -> Result<usize, LoadError> {
        let mut line_breaks = 0;
        loop {
            while is_white(self.cursor.current()) {
                self.cursor.advance();
            }
            if allow_comments && self.cursor.current() == '#' {
                while !is_eol(self.cursor.current()) && self.cursor.current() != '\0' {
                    self.cursor.advance();
                }
            }
            if !is_eol(self.cursor.current()) {
                break;
            }
            self.read_line_break()?;
            line_breaks += 1;
            self.line_indent = 0;
            while self.cursor.current() == ' ' {
                self.line_indent += 1;
                self.cursor.advance();
            }
        }
        if check_indent != -1 && line_breaks != 0 && self.line_indent < check_indent {
            self.warn("deficient indentation");
        }
        Ok(line_breaks)
    }

    /// `true` if the cursor sits on `---` or `...` followed by whitespace.
    /// Callers only consult this at the start of a line.
    fn test_document_separator(&self) -> bool {
        let ch = self.cursor.current();
        (ch == '-' || ch == '.')
            && self.cursor.peek(1) == ch
            && self.cursor.peek(2) == ch
            && is_ws_or_eol(self.cursor.peek(3))
    }

    fn column_indent(&self) -> i64 {
        #[allow(
            clippy::cast_possible_wrap,
            reason = "columns are bounded by the input length"
        )]
        let column = self.cursor.column() as i64;
        column
    }

    // ---- node properties ----

    fn read_anchor_property(&mut self) -> Result<bool, LoadError> {
        if self.cursor.current() != '&' {
            return Ok(false);
        }
        if self.anchor.is_some() {
            return Err(self.syntax("duplication of an anchor property"));
        }
        self.cursor.advance();
        let start = self.cursor.offset();
        while !is_ws_or_eol(self.cursor.current()) && !is_flow_indicator(self.cursor.current()) {
            self.cursor.advance();
        }
        if self.cursor.offset() == start {
            return Err(self.syntax("name of an anchor node must contain at least one character"));
        }
        self.anchor = Some(self.cursor.slice(start, self.cursor.offset()).to_owned());
        Ok(true)
    }

    fn read_tag_property(&mut self) -> Result<bool, LoadError> {
        if self.cursor.current() != '!' {
            return Ok(false);
        }
        if self.tag.is_some() {
            return Err(self.syntax("duplication of a tag property"));
        }
        self.cursor.advance();
        let mut handle = match self.cursor.current() {
            '<' => {
                self.cursor.advance();
                let start = self.cursor.offset();
                while self.cursor.current() != '>' && self.cursor.current() != '\0' {
                    self.cursor.advance();
                }
                if self.cursor.current() != '>' {
                    return Err(
                        self.syntax("unexpected end of the stream within a verbatim tag")
                    );
                }
                let name = self.cursor.slice(start, self.cursor.offset()).to_owned();
                self.cursor.advance();
                if name.is_empty() {
                    return Err(self.syntax("a verbatim tag must contain a tag name"));
                }
                if !name.chars().all(is_tag_uri_char) {
                    return Err(
                        self.syntax(format!("tag name cannot contain such characters: {name}"))
                    );
                }
                self.tag = Some(PendingTag::Explicit(name));
                return Ok(true);
            }
            '!' => {
                self.cursor.advance();
                "!!".to_owned()
            }
            _ => "!".to_owned(),
        };
        let mut is_named = handle == "!!";
        let mut start = self.cursor.offset();
        while !is_ws_or_eol(self.cursor.current()) {
            if self.cursor.current() == '!' {
                if is_named {
                    return Err(self.syntax("tag suffix cannot contain exclamation marks"));
                }
                let named = format!("!{}!", self.cursor.slice(start, self.cursor.offset()));
                if !is_valid_tag_handle(&named) {
                    return Err(self.syntax("named tag handle cannot contain such characters"));
                }
                is_named = true;
                handle = named;
                self.cursor.advance();
                start = self.cursor.offset();
            } else {
                self.cursor.advance();
            }
        }
        let suffix = self.cursor.slice(start, self.cursor.offset()).to_owned();
        if suffix.chars().any(is_flow_indicator) {
            return Err(self.syntax("tag suffix cannot contain flow indicator characters"));
        }
        if !suffix.chars().all(is_tag_uri_char) {
            return Err(self.syntax(format!("tag name cannot contain such characters: {suffix}")));
        }
        let tag = if let Some(prefix) = self.tag_handles.get(&handle) {
            PendingTag::Explicit(format!("{prefix}{suffix}"))
        } else if handle == "!" {
            if suffix.is_empty() {
                PendingTag::NonSpecific
            } else {
                PendingTag::Explicit(format!("!{suffix}"))
            }
        } else if handle == "!!" {
            PendingTag::Explicit(expand_secondary_handle(&suffix))
        } else {
            return Err(self.syntax(format!("undeclared tag handle \"{handle}\"")));
        };
        self.tag = Some(tag);
        Ok(true)
    }

    fn read_alias(&mut self) -> Result<Option<NodeId>, LoadError> {
        if self.cursor.current() != '*' {
            return Ok(None);
        }
        let prop_position = self.cursor.position();
        self.cursor.advance();
        let start = self.cursor.offset();
        while !is_ws_or_eol(self.cursor.current()) && !is_flow_indicator(self.cursor.current()) {
            self.cursor.advance();
        }
        if self.cursor.offset() == start {
            return Err(self.syntax("name of an alias node must contain at least one character"));
        }
        let name = self.cursor.slice(start, self.cursor.offset()).to_owned();
        let Some(&id) = self.anchors.get(&name) else {
            return Err(self.error_at(ErrorKind::UndefinedAlias(name), prop_position));
        };
        self.skip_separation_space(true, -1)?;
        Ok(Some(id))
    }

    // ---- composition ----

    /// Compose one node at the cursor. Returns `None` when there is no
    /// content at this position (the caller decides whether that means an
    /// empty value or the end of a collection).
    pub(crate) fn compose_node(
        &mut self,
        parent_indent: i64,
        context: Context,
        allow_to_seek: bool,
        allow_compact: bool,
    ) -> Result<Option<NodeId>, LoadError> {
        self.tag = None;
        self.anchor = None;
        self.result_merge = false;

        let block_context = matches!(context, Context::BlockOut | Context::BlockIn);
        let allow_block_scalars = block_context;
        let mut allow_block_collections = block_context;
        let mut at_new_line = false;
        let mut indent_status = 1i8;

        if allow_to_seek && self.skip_separation_space(true, -1)? > 0 {
            at_new_line = true;
            indent_status = indent_cmp(self.line_indent, parent_indent);
        }

        if indent_status == 1 {
            while self.read_tag_property()? || self.read_anchor_property()? {
                if self.skip_separation_space(true, -1)? > 0 {
                    at_new_line = true;
                    allow_block_collections = block_context;
                    indent_status = indent_cmp(self.line_indent, parent_indent);
                } else {
                    allow_block_collections = false;
                }
            }
        }
        if allow_block_collections {
            allow_block_collections = at_new_line || allow_compact;
        }

        let tag = self.tag.take();
        let anchor = self.anchor.take();
        let mut composed = Composed::None;

        if indent_status == 1 || context == Context::BlockOut {
            let flow_indent = if context.in_flow() {
                parent_indent
            } else {
                parent_indent + 1
            };
            let block_indent = self.column_indent();

            if indent_status == 1 {
                if allow_block_collections {
                    if let Some(id) = self.read_block_sequence(block_indent, anchor.as_deref())? {
                        composed = Composed::Node(id);
                    } else if let Some(id) =
                        self.read_block_mapping(block_indent, flow_indent, anchor.as_deref())?
                    {
                        composed = Composed::Node(id);
                    }
                }
                if matches!(composed, Composed::None) {
                    if let Some(id) = self.read_flow_collection(flow_indent, anchor.as_deref())? {
                        composed = Composed::Node(id);
                    } else if allow_block_scalars
                        && let Some((literal, span)) = self.read_block_scalar(flow_indent)?
                    {
                        composed = Composed::Scalar {
                            literal,
                            span,
                            plain: false,
                        };
                    } else if let Some((literal, span)) = self.read_single_quoted_scalar()? {
                        composed = Composed::Scalar {
                            literal,
                            span,
                            plain: false,
                        };
                    } else if let Some((literal, span)) = self.read_double_quoted_scalar()? {
                        composed = Composed::Scalar {
                            literal,
                            span,
                            plain: false,
                        };
                    } else if let Some(id) = self.read_alias()? {
                        if tag.is_some() || anchor.is_some() {
                            return Err(
                                self.syntax("an alias node should not have any properties")
                            );
                        }
                        return Ok(Some(id));
                    } else if let Some((literal, span)) =
                        self.read_plain_scalar(flow_indent, context == Context::FlowIn)?
                    {
                        composed = Composed::Scalar {
                            literal,
                            span,
                            plain: true,
                        };
                    }
                }
            } else if indent_status == 0
                && allow_block_collections
                // a block sequence may sit at the same indent as its parent
                // mapping key
                && let Some(id) = self.read_block_sequence(block_indent, anchor.as_deref())?
            {
                composed = Composed::Node(id);
            }
        }

        match composed {
            Composed::Node(id) => {
                if let Some(PendingTag::Explicit(tag_name)) = tag {
                    self.check_node_tag(&tag_name, id)?;
                }
                if let Some(name) = anchor {
                    self.anchors.insert(name, id);
                }
                Ok(Some(id))
            }
            Composed::Scalar {
                literal,
                span,
                plain,
            } => {
                let value = match tag {
                    None if plain => {
                        let (value, matched) = self.schema.resolve_implicit_tagged(&literal);
                        self.result_merge = matched == Some(MERGE_TAG);
                        value
                    }
                    None | Some(PendingTag::NonSpecific) => Value::String(literal),
                    Some(PendingTag::Explicit(tag_name)) => {
                        self.resolve_scalar_tag(&tag_name, literal, true)?
                    }
                };
                let id = self.alloc(value, span);
                if let Some(name) = anchor {
                    self.anchors.insert(name, id);
                }
                Ok(Some(id))
            }
            Composed::None => {
                if tag.is_none() && anchor.is_none() {
                    return Ok(None);
                }
                // An empty node with properties still exists; it resolves
                // from the empty literal.
                let here = self.cursor.offset();
                let span = Span::new((), here..here);
                let value = match tag {
                    Some(PendingTag::Explicit(tag_name)) => {
                        self.resolve_scalar_tag(&tag_name, String::new(), false)?
                    }
                    Some(PendingTag::NonSpecific) => Value::String(String::new()),
                    None => Value::Null,
                };
                let id = self.alloc(value, span);
                if let Some(name) = anchor {
                    self.anchors.insert(name, id);
                }
                Ok(Some(id))
            }
        }
    }

    /// Resolve an explicitly tagged scalar literal.
    ///
    /// Unknown tags are tolerated on scalars: the literal is kept as a
    /// string and a warning is emitted.
    fn resolve_scalar_tag(
        &mut self,
        tag_name: &str,
        literal: String,
        has_content: bool,
    ) -> Result<Value, LoadError> {
        match self.schema.rule(tag_name) {
            Some(rule) if rule.kind == NodeKind::Scalar => {
                match rule.construct.and_then(|construct| construct(&literal)) {
                    Some(value) => {
                        self.result_merge = tag_name == MERGE_TAG;
                        Ok(value)
                    }
                    None => Err(self.error(ErrorKind::TagResolveFailed(tag_name.to_owned()))),
                }
            }
            Some(rule) => {
                if has_content {
                    Err(self.error(ErrorKind::TagKindMismatch {
                        tag: tag_name.to_owned(),
                        expected: rule.kind,
                        found: NodeKind::Scalar,
                    }))
                } else {
                    // An explicit collection tag on an empty node.
                    Ok(Value::Null)
                }
            }
            None => {
                self.warn(format!("unknown tag !<{tag_name}>, the value is kept as a string"));
                Ok(Value::String(literal))
            }
        }
    }

    /// Check an explicit tag against an already-composed node.
    fn check_node_tag(&mut self, tag_name: &str, id: NodeId) -> Result<(), LoadError> {
        let found = self.node_kind(id);
        match self.schema.rule(tag_name) {
            Some(rule) if rule.kind == found => Ok(()),
            Some(rule) => Err(self.error(ErrorKind::TagKindMismatch {
                tag: tag_name.to_owned(),
                expected: rule.kind,
                found,
            })),
            None if found == NodeKind::Scalar => {
                self.warn(format!("unknown tag !<{tag_name}>, the value is kept as a string"));
                Ok(())
            }
            None => Err(self.error(ErrorKind::UnknownTag(tag_name.to_owned()))),
        }
    }

    // ---- mapping pairs ----

    fn find_entry(&self, entries: &[(NodeId, NodeId)], key: NodeId) -> Option<usize> {
        entries.iter().position(|&(existing, _)| {
            let mut visited = HashSet::new();
            structural_eq(&self.nodes, existing, &self.nodes, key, &mut visited)
        })
    }

    /// Merge the pairs of `source` (which must be a mapping) into `entries`,
    /// marking the copied pairs overridable.
    fn merge_mappings(
        &mut self,
        entries: &mut Vec<(NodeId, NodeId)>,
        overridable: &mut Vec<bool>,
        source: NodeId,
        at: Position,
    ) -> Result<(), LoadError> {
        let Some(Value::Mapping(pairs)) = self.nodes.get(source.index()).cloned() else {
            return Err(self.error_at(
                ErrorKind::Syntax(
                    "cannot merge mappings; the provided source object is unacceptable".to_owned(),
                ),
                at,
            ));
        };
        for (key, value) in pairs {
            if self.find_entry(entries, key).is_none() {
                entries.push((key, value));
                overridable.push(true);
            }
        }
        Ok(())
    }

    /// Store one key/value pair, honoring merge keys and the duplicate-key
    /// policy. `at` is where the pair started, for error reporting.
    fn store_mapping_pair(
        &mut self,
        entries: &mut Vec<(NodeId, NodeId)>,
        overridable: &mut Vec<bool>,
        key: NodeId,
        value: NodeId,
        key_is_merge: bool,
        at: Position,
    ) -> Result<(), LoadError> {
        if key_is_merge && self.schema.merge_keys {
            match self.nodes.get(value.index()).cloned() {
                Some(Value::Sequence(items)) => {
                    for item in items {
                        self.merge_mappings(entries, overridable, item, at)?;
                    }
                }
                _ => self.merge_mappings(entries, overridable, value, at)?,
            }
            return Ok(());
        }
        if let Some(index) = self.find_entry(entries, key) {
            let was_overridable = overridable.get(index).copied().unwrap_or(false);
            if !was_overridable && !self.allow_duplicate_keys {
                return Err(self.error_at(ErrorKind::DuplicateKey(self.key_display(key)), at));
            }
            // Overwrite in place, preserving the original entry position.
            if let Some(entry) = entries.get_mut(index) {
                entry.1 = value;
            }
            if let Some(flag) = overridable.get_mut(index) {
                *flag = false;
            }
        } else {
            entries.push((key, value));
            overridable.push(false);
        }
        Ok(())
    }

    fn key_display(&self, id: NodeId) -> String {
        match self.nodes.get(id.index()) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Int(n)) => n.to_string(),
            Some(Value::Float(x)) => x.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Null) | None => "null".to_owned(),
            Some(Value::Sequence(_)) => "<sequence>".to_owned(),
            Some(Value::Mapping(_)) => "<mapping>".to_owned(),
        }
    }

    // ---- directives & documents ----

    fn read_directive(&mut self) -> Result<(), LoadError> {
        self.cursor.advance();
        let start = self.cursor.offset();
        while !is_ws_or_eol(self.cursor.current()) {
            self.cursor.advance();
        }
        let name = self.cursor.slice(start, self.cursor.offset()).to_owned();
        let mut args: Vec<String> = Vec::new();
        loop {
            while is_white(self.cursor.current()) {
                self.cursor.advance();
            }
            if self.cursor.current() == '#' {
                while !is_eol(self.cursor.current()) && self.cursor.current() != '\0' {
                    self.cursor.advance();
                }
                break;
            }
            if is_eol(self.cursor.current()) || self.cursor.current() == '\0' {
                break;
            }
            let arg_start = self.cursor.offset();
            while !is_ws_or_eol(self.cursor.current()) {
                self.cursor.advance();
            }
            args.push(self.cursor.slice(arg_start, self.cursor.offset()).to_owned());
        }
        if self.cursor.current() != '\0' {
            self.read_line_break()?;
        }
        match name.as_str() {
            "YAML" => self.handle_yaml_directive(&args),
            "TAG" => self.handle_tag_directive(&args),
            _ => {
                self.warn(format!("unknown document directive \"{name}\""));
                Ok(())
            }
        }
    }

    fn handle_yaml_directive(&mut self, args: &[String]) -> Result<(), LoadError> {
        if self.version.is_some() {
            return Err(self.error(ErrorKind::DuplicateDirective("YAML".to_owned())));
        }
        let [arg] = args else {
            return Err(self.error(ErrorKind::InvalidDirective(
                "YAML directive accepts exactly one argument".to_owned(),
            )));
        };
        let parsed = arg
            .split_once('.')
            .and_then(|(major, minor)| Some((major.parse::<u32>().ok()?, minor.parse::<u32>().ok()?)));
        let Some((major, minor)) = parsed else {
            return Err(self.error(ErrorKind::InvalidDirective(
                "ill-formed argument of the YAML directive".to_owned(),
            )));
        };
        if major != 1 {
            return Err(self.error(ErrorKind::InvalidDirective(
                "unacceptable YAML version of the document".to_owned(),
            )));
        }
        self.version = Some((major, minor));
        self.check_line_breaks = minor < 2;
        if minor != 1 && minor != 2 {
            self.warn("unsupported YAML version of the document");
        }
        Ok(())
    }

    fn handle_tag_directive(&mut self, args: &[String]) -> Result<(), LoadError> {
        let [handle, prefix] = args else {
            return Err(self.error(ErrorKind::InvalidDirective(
                "TAG directive accepts exactly two arguments".to_owned(),
            )));
        };
        if !is_valid_tag_handle(handle) {
            return Err(self.error(ErrorKind::InvalidDirective(
                "ill-formed tag handle (first argument) of the TAG directive".to_owned(),
            )));
        }
        if self.tag_handles.contains_key(handle.as_str()) {
            return Err(self.error(ErrorKind::DuplicateDirective(format!(
                "TAG; there is a previously declared suffix for \"{handle}\""
            ))));
        }
        if !prefix.chars().all(is_tag_uri_char) {
            return Err(self.error(ErrorKind::InvalidDirective(
                "ill-formed tag prefix (second argument) of the TAG directive".to_owned(),
            )));
        }
        self.tag_handles.insert(handle.clone(), prefix.clone());
        Ok(())
    }

    /// Read one document: directives, the optional `---` marker, the root
    /// node, and the optional `...` terminator.
    pub(crate) fn read_document(&mut self) -> Result<Document, LoadError> {
        self.nodes.clear();
        self.spans.clear();
        self.anchors.clear();
        self.tag_handles.clear();
        self.version = None;
        self.check_line_breaks = false;

        let doc_start = self.cursor.offset();
        let mut has_directives = false;
        loop {
            self.skip_separation_space(true, -1)?;
            if self.line_indent > 0 || self.cursor.current() != '%' {
                break;
            }
            has_directives = true;
            self.read_directive()?;
        }

        if self.line_indent == 0
            && self.cursor.current() == '-'
            && self.cursor.peek(1) == '-'
            && self.cursor.peek(2) == '-'
            && is_ws_or_eol(self.cursor.peek(3))
        {
            for _ in 0..3 {
                self.cursor.advance();
            }
            self.skip_separation_space(true, -1)?;
        } else if has_directives {
            return Err(self.syntax("directives end mark is expected"));
        }

        let root = self.compose_node(self.line_indent - 1, Context::BlockOut, false, true)?;
        self.skip_separation_space(true, -1)?;

        if self.check_line_breaks {
            let non_ascii_breaks = self
                .cursor
                .slice(doc_start, self.cursor.offset())
                .chars()
                .any(|ch| matches!(ch, '\u{85}' | '\u{2028}' | '\u{2029}'));
            if non_ascii_breaks {
                self.warn("non-ASCII line breaks are interpreted as content");
            }
        }

        let root = match root {
            Some(id) => id,
            None => {
                let here = self.cursor.offset();
                self.alloc(Value::Null, Span::new((), here..here))
            }
        };

        if self.cursor.at_line_start() && self.test_document_separator() {
            if self.cursor.current() == '.' {
                for _ in 0..3 {
                    self.cursor.advance();
                }
                self.skip_separation_space(true, -1)?;
            }
        } else if !self.at_end() {
            return Err(self.syntax("end of the stream or a document separator is expected"));
        }

        log::debug!(
            "loaded document with {} nodes (schema: {})",
            self.nodes.len(),
            self.schema.name
        );
        let nodes = std::mem::take(&mut self.nodes);
        let spans = std::mem::take(&mut self.spans);
        Ok(Document::new(nodes, spans, root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader(text: &str) -> Loader {
        let mut sanitized = text.to_owned();
        if !sanitized.is_empty() && !sanitized.ends_with(['\n', '\r']) {
            sanitized.push('\n');
        }
        sanitized.push('\0');
        Loader::new(sanitized, SchemaKind::Default, false, None)
    }

    #[test]
    fn test_skip_separation_space_counts_breaks() {
        let mut state = loader("  # comment\n\n   x");
        let breaks = state.skip_separation_space(true, -1).unwrap();
        assert_eq!(breaks, 2);
        assert_eq!(state.line_indent, 3);
        assert_eq!(state.cursor.current(), 'x');
    }

    #[test]
    fn test_document_separator_detection() {
        let state = loader("--- x");
        assert!(state.test_document_separator());
        let state = loader("...");
        assert!(state.test_document_separator());
        let state = loader("----");
        assert!(!state.test_document_separator());
    }

    #[test]
    fn test_tag_property_expansion() {
        let mut state = loader("!!int 5");
        assert!(state.read_tag_property().unwrap());
        assert_eq!(
            state.tag,
            Some(PendingTag::Explicit("tag:yaml.org,2002:int".to_owned()))
        );

        let mut state = loader("!local x");
        assert!(state.read_tag_property().unwrap());
        assert_eq!(state.tag, Some(PendingTag::Explicit("!local".to_owned())));

        let mut state = loader("! x");
        assert!(state.read_tag_property().unwrap());
        assert_eq!(state.tag, Some(PendingTag::NonSpecific));

        let mut state = loader("!<tag:example.com,2024:widget> x");
        assert!(state.read_tag_property().unwrap());
        assert_eq!(
            state.tag,
            Some(PendingTag::Explicit("tag:example.com,2024:widget".to_owned()))
        );
    }

    #[test]
    fn test_undeclared_named_handle_is_an_error() {
        let mut state = loader("!e!suffix x");
        let err = state.read_tag_property().unwrap_err();
        assert!(err.to_string().contains("undeclared tag handle"));
    }

    #[test]
    fn test_anchor_property_requires_a_name() {
        let mut state = loader("& x");
        assert!(state.read_anchor_property().is_err());
        let mut state = loader("&a x");
        assert!(state.read_anchor_property().unwrap());
        assert_eq!(state.anchor.as_deref(), Some("a"));
    }

    #[test]
    fn test_yaml_directive_validation() {
        let mut state = loader("");
        assert!(state.handle_yaml_directive(&["1.2".to_owned()]).is_ok());
        // A second %YAML directive is rejected.
        let err = state.handle_yaml_directive(&["1.1".to_owned()]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateDirective("YAML".to_owned()));

        let mut state = loader("");
        assert!(state.handle_yaml_directive(&["2.0".to_owned()]).is_err());
        let mut state = loader("");
        assert!(state.handle_yaml_directive(&["abc".to_owned()]).is_err());
    }

    #[test]
    fn test_tag_directive_registers_handle() {
        let mut state = loader("");
        let args = ["!e!".to_owned(), "tag:example.com,2024:".to_owned()];
        assert!(state.handle_tag_directive(&args).is_ok());
        assert_eq!(
            state.tag_handles.get("!e!").map(String::as_str),
            Some("tag:example.com,2024:")
        );
        // Redeclaring the same handle fails.
        assert!(state.handle_tag_directive(&args).is_err());
    }
}
