// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Error and warning types for YAML loading.

use crate::span::Position;
use crate::value::NodeKind;

/// An error encountered while loading a document.
///
/// Errors include their source position and a one-line excerpt of the
/// offending source, enabling accurate error reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadError {
    /// The kind of error.
    pub kind: ErrorKind,
    /// The position in the source where the error occurred.
    pub position: Position,
    /// The source line containing the error, if available.
    pub excerpt: Option<String>,
}

/// The kind of load error.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// Grammar violation with a human-readable reason.
    Syntax(String),

    /// Unterminated quoted scalar (includes quote style for better messaging).
    UnterminatedQuotedString {
        /// `true` for `"…"`, `false` for `'…'`.
        double_quoted: bool,
    },

    /// Invalid escape sequence in a double-quoted scalar.
    InvalidEscape(char),

    /// Invalid indentation, with the structure it was found in.
    BadIndentation(&'static str),

    /// Invalid directive format or content.
    InvalidDirective(String),

    /// Duplicate directive (e.g., two `%YAML` directives).
    DuplicateDirective(String),

    /// Duplicate key in a mapping.
    DuplicateKey(String),

    /// Alias reference to an anchor that was never defined.
    UndefinedAlias(String),

    /// Explicit tag declares a node kind incompatible with the node.
    TagKindMismatch {
        /// The normalized tag name.
        tag: String,
        /// The kind the tag's rule expects.
        expected: NodeKind,
        /// The kind the node actually has.
        found: NodeKind,
    },

    /// Explicit tag matched a rule but the rule rejected the literal.
    TagResolveFailed(String),

    /// Explicit tag on a collection that no rule in the active schema knows.
    UnknownTag(String),

    /// More than one document found where exactly one was required.
    MultipleDocuments,
}

/// The error family an [`ErrorKind`] belongs to.
///
/// The loader reports many specific kinds; callers that only care about the
/// broad policy distinction (retry with different options, report, give up)
/// can match on the category instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Grammar violations.
    Syntax,
    /// Duplicate-key policy violations.
    DuplicateKey,
    /// Unresolved anchor references.
    Alias,
    /// Tag/node-kind incompatibilities and tag resolution failures.
    Tag,
    /// Single-document parse found more than one document.
    MultipleDocuments,
}

impl ErrorKind {
    /// The broad family this kind belongs to.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Syntax(_)
            | Self::UnterminatedQuotedString { .. }
            | Self::InvalidEscape(_)
            | Self::BadIndentation(_)
            | Self::InvalidDirective(_)
            | Self::DuplicateDirective(_) => ErrorCategory::Syntax,
            Self::DuplicateKey(_) => ErrorCategory::DuplicateKey,
            Self::UndefinedAlias(_) => ErrorCategory::Alias,
            Self::TagKindMismatch { .. } | Self::TagResolveFailed(_) | Self::UnknownTag(_) => {
                ErrorCategory::Tag
            }
            Self::MultipleDocuments => ErrorCategory::MultipleDocuments,
        }
    }

    /// Get a suggestion for how to fix this error.
    ///
    /// Returns `Some(suggestion)` if a helpful fix suggestion is available,
    /// or `None` if no specific suggestion applies.
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::UnterminatedQuotedString { .. } => {
                Some("Add the matching closing quote character")
            }
            Self::InvalidEscape(_) => {
                Some("Valid escape sequences: \\n, \\r, \\t, \\\\, \\\", \\0, \\x##, \\u####")
            }
            Self::BadIndentation(_) => {
                Some("YAML uses spaces for indentation; ensure consistent indentation levels")
            }
            Self::DuplicateKey(_) => Some(
                "Remove or rename one of the duplicate keys, or enable allow_duplicate_keys",
            ),
            Self::UndefinedAlias(_) => {
                Some("Define the anchor with &name before referencing it with *name")
            }
            Self::TagKindMismatch { .. } | Self::TagResolveFailed(_) | Self::UnknownTag(_) => {
                Some("Check the tag against the active schema's rules")
            }
            Self::MultipleDocuments => {
                Some("Use parse_all to read a multi-document stream")
            }
            Self::Syntax(_) | Self::InvalidDirective(_) | Self::DuplicateDirective(_) => None,
        }
    }
}

impl LoadError {
    /// Create a new error with just a kind and position.
    #[must_use]
    pub const fn new(kind: ErrorKind, position: Position) -> Self {
        Self {
            kind,
            position,
            excerpt: None,
        }
    }

    /// Attach a one-line source excerpt to the error.
    #[must_use]
    pub fn with_excerpt(mut self, excerpt: String) -> Self {
        self.excerpt = Some(excerpt);
        self
    }

    /// The broad family this error belongs to.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Get a suggestion for how to fix this error.
    ///
    /// Delegates to [`ErrorKind::suggestion()`].
    #[must_use]
    pub fn suggestion(&self) -> Option<&'static str> {
        self.kind.suggestion()
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ErrorKind::Syntax(msg) => write!(f, "{msg}")?,
            ErrorKind::UnterminatedQuotedString { double_quoted } => {
                let quote = if *double_quoted { '"' } else { '\'' };
                write!(f, "unterminated quoted scalar, missing closing {quote}")?;
            }
            ErrorKind::InvalidEscape(ch) => write!(f, "unknown escape sequence '\\{ch}'")?,
            ErrorKind::BadIndentation(what) => write!(f, "bad indentation of {what}")?,
            ErrorKind::InvalidDirective(detail) => write!(f, "invalid directive: {detail}")?,
            ErrorKind::DuplicateDirective(name) => write!(f, "duplication of %{name} directive")?,
            ErrorKind::DuplicateKey(key) => write!(f, "duplicated mapping key '{key}'")?,
            ErrorKind::UndefinedAlias(name) => {
                write!(f, "unidentified alias '*{name}': anchor '&{name}' not defined")?;
            }
            ErrorKind::TagKindMismatch {
                tag,
                expected,
                found,
            } => write!(
                f,
                "unacceptable node kind for !<{tag}> tag; it should be \"{expected}\", not \"{found}\""
            )?,
            ErrorKind::TagResolveFailed(tag) => {
                write!(f, "cannot resolve a node with !<{tag}> tag")?;
            }
            ErrorKind::UnknownTag(tag) => write!(f, "unknown tag !<{tag}>")?,
            ErrorKind::MultipleDocuments => write!(
                f,
                "found more than one document in the stream; expected a single document"
            )?,
        }
        write!(f, " at {}", self.position)?;
        if let Some(excerpt) = &self.excerpt {
            write!(f, "\n\n  {excerpt}\n  ")?;
            for _ in 0..self.position.column.min(excerpt.chars().count()) {
                write!(f, " ")?;
            }
            write!(f, "^")?;
        }
        Ok(())
    }
}

impl std::error::Error for LoadError {}

/// A non-fatal anomaly reported through the warning sink.
///
/// Warnings never alter the resolved output; they exist purely for
/// observability. If no sink is configured they are discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    /// Human-readable description of the anomaly.
    pub message: String,
    /// Where in the source the anomaly was seen.
    pub position: Position,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.message, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: usize, column: usize) -> Position {
        Position {
            offset: 0,
            line,
            column,
        }
    }

    #[test]
    fn test_error_display() {
        let err = LoadError::new(
            ErrorKind::UnterminatedQuotedString {
                double_quoted: true,
            },
            pos(2, 7),
        );
        assert_eq!(
            err.to_string(),
            "unterminated quoted scalar, missing closing \" at line 3, column 8"
        );
    }

    #[test]
    fn test_error_display_with_excerpt() {
        let err = LoadError::new(
            ErrorKind::DuplicateKey("name".to_owned()),
            pos(0, 0),
        )
        .with_excerpt("name: twice".to_owned());
        let rendered = err.to_string();
        assert!(rendered.contains("duplicated mapping key 'name'"));
        assert!(rendered.contains("name: twice"));
        assert!(rendered.ends_with('^'));
    }

    #[test]
    fn test_error_categories() {
        let cases = [
            (ErrorKind::Syntax("x".to_owned()), ErrorCategory::Syntax),
            (
                ErrorKind::BadIndentation("a mapping entry"),
                ErrorCategory::Syntax,
            ),
            (
                ErrorKind::DuplicateKey("k".to_owned()),
                ErrorCategory::DuplicateKey,
            ),
            (
                ErrorKind::UndefinedAlias("a".to_owned()),
                ErrorCategory::Alias,
            ),
            (
                ErrorKind::UnknownTag("tag:example.com,2000:x".to_owned()),
                ErrorCategory::Tag,
            ),
            (ErrorKind::MultipleDocuments, ErrorCategory::MultipleDocuments),
        ];
        for (kind, category) in cases {
            assert_eq!(kind.category(), category, "{kind:?}");
        }
    }

    #[test]
    fn test_error_suggestions() {
        assert!(
            ErrorKind::DuplicateKey("k".to_owned())
                .suggestion()
                .is_some()
        );
        assert!(ErrorKind::Syntax("x".to_owned()).suggestion().is_none());
    }
}
