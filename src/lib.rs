// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! A YAML document loader.
//!
//! Converts textual YAML into fully resolved [`Document`]s: mappings,
//! sequences and typed scalars, following the indentation-sensitive YAML 1.1
//! grammar. Supported surface includes block and flow collections, all four
//! scalar styles, anchors and aliases (shared subtrees and cycles are
//! legal), tags, `%YAML`/`%TAG` directives, multi-document streams, and
//! merge keys.
//!
//! Scalar typing is schema-driven: the default schema resolves the YAML 1.1
//! extended literals (`0x1A`, `1_000`, `.inf`, `~`, ...), while
//! [`SchemaKind::Core`] restricts resolution to strict literals and
//! [`SchemaKind::Failsafe`] keeps every scalar a string.
//!
//! # Examples
//!
//! ```
//! let doc = yaml_loader::parse("name: demo\ncount: 3")?;
//! let root = doc.root();
//! assert_eq!(root.get("name").and_then(|n| n.as_str()), Some("demo"));
//! assert_eq!(root.get("count").and_then(|n| n.as_int()), Some(3));
//! # Ok::<(), yaml_loader::LoadError>(())
//! ```
//!
//! Non-default behavior goes through [`LoadOptions`]:
//!
//! ```
//! use yaml_loader::{LoadOptions, SchemaKind};
//!
//! let doc = LoadOptions::new()
//!     .schema(SchemaKind::Failsafe)
//!     .parse("answer: 42")?;
//! // under the failsafe schema nothing is typed
//! assert_eq!(doc.root().get("answer").and_then(|n| n.as_str()), Some("42"));
//! # Ok::<(), yaml_loader::LoadError>(())
//! ```

mod cursor;
pub mod error;
mod loader;
pub mod schema;
pub mod span;
pub mod stream;
pub mod value;

use chumsky::span::Span as _;

pub use crate::error::{ErrorCategory, ErrorKind, LoadError, Warning};
pub use crate::schema::SchemaKind;
pub use crate::span::{Position, Span};
pub use crate::stream::DocumentStream;
pub use crate::value::{Document, NodeId, NodeKind, NodeRef, Value};

use crate::loader::Loader;

/// Prepare raw input for the loader: strip a leading BOM, guarantee a
/// trailing line break, and append the `\0` sentinel the cursor relies on.
fn sanitize_input(input: &str) -> String {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut sanitized = input.to_owned();
    if !sanitized.is_empty() && !sanitized.ends_with(['\n', '\r']) {
        sanitized.push('\n');
    }
    sanitized.push('\0');
    sanitized
}

fn empty_document() -> Document {
    Document::new(vec![Value::Null], vec![Span::new((), 0..0)], NodeId(0))
}

/// Options controlling how a YAML stream is loaded.
///
/// Builder-style: configure, then call [`LoadOptions::parse`],
/// [`LoadOptions::parse_all`] or [`LoadOptions::stream`].
pub struct LoadOptions {
    schema: SchemaKind,
    allow_duplicate_keys: bool,
    on_warning: Option<Box<dyn FnMut(Warning)>>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            schema: SchemaKind::Default,
            allow_duplicate_keys: false,
            on_warning: None,
        }
    }
}

impl std::fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadOptions")
            .field("schema", &self.schema)
            .field("allow_duplicate_keys", &self.allow_duplicate_keys)
            .field("on_warning", &self.on_warning.is_some())
            .finish()
    }
}

impl LoadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the schema used for scalar resolution.
    #[must_use]
    pub fn schema(mut self, schema: SchemaKind) -> Self {
        self.schema = schema;
        self
    }

    /// Allow duplicate mapping keys; the later value overwrites the earlier
    /// one in place. Off by default, where a duplicate key is an error.
    #[must_use]
    pub fn allow_duplicate_keys(mut self, allow: bool) -> Self {
        self.allow_duplicate_keys = allow;
        self
    }

    /// Install a sink for non-fatal warnings (unknown directives, unknown
    /// tags on scalars, ...). Without a sink, warnings are discarded.
    #[must_use]
    pub fn on_warning(mut self, sink: impl FnMut(Warning) + 'static) -> Self {
        self.on_warning = Some(Box::new(sink));
        self
    }

    /// Lazily iterate over the documents of `input`.
    #[must_use]
    pub fn stream(self, input: &str) -> DocumentStream {
        log::debug!("loading YAML stream with the {:?} schema", self.schema);
        let loader = Loader::new(
            sanitize_input(input),
            self.schema,
            self.allow_duplicate_keys,
            self.on_warning,
        );
        DocumentStream::new(loader)
    }

    /// Parse `input` as a single document.
    ///
    /// # Errors
    ///
    /// Fails on any load error, and with a
    /// [`MultipleDocuments`](ErrorCategory::MultipleDocuments) error if the
    /// stream holds more than one document. Empty input yields a null
    /// document.
    pub fn parse(self, input: &str) -> Result<Document, LoadError> {
        let mut stream = self.stream(input);
        let Some(first) = stream.next() else {
            return Ok(empty_document());
        };
        let first = first?;
        let next_position = stream.position();
        match stream.next() {
            None => Ok(first),
            Some(Err(error)) => Err(error),
            Some(Ok(_)) => Err(LoadError::new(ErrorKind::MultipleDocuments, next_position)),
        }
    }

    /// Parse every document of `input`.
    ///
    /// # Errors
    ///
    /// Fails on the first load error; documents before it are dropped.
    pub fn parse_all(self, input: &str) -> Result<Vec<Document>, LoadError> {
        self.stream(input).collect()
    }
}

/// Parse `input` as a single document with default options.
///
/// # Errors
///
/// See [`LoadOptions::parse`].
pub fn parse(input: &str) -> Result<Document, LoadError> {
    LoadOptions::new().parse(input)
}

/// Parse every document of `input` with default options.
///
/// # Errors
///
/// See [`LoadOptions::parse_all`].
pub fn parse_all(input: &str) -> Result<Vec<Document>, LoadError> {
    LoadOptions::new().parse_all(input)
}
