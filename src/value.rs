// Copyright (c) 2026 Arista Networks, Inc.
// Use of this source code is governed by the Apache License 2.0
// that can be found in the LICENSE file.

//! Resolved YAML values and the per-document node arena.
//!
//! A [`Document`] stores its nodes in an arena indexed by [`NodeId`].
//! Collections refer to their children by id rather than by ownership, so an
//! aliased subtree is shared between all of its parents - and a collection
//! may legally contain a reference to itself or an ancestor. Any full
//! traversal therefore carries a visited set keyed by node identity; the
//! built-in structural equality does exactly that and is safe on cyclic
//! documents.

use std::collections::HashSet;

use crate::span::Span;

/// Index of a node within its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// The structural kind of a node, as seen by tag resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Null, bool, number or string.
    Scalar,
    /// An ordered list of nodes.
    Sequence,
    /// An ordered list of key/value pairs.
    Mapping,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Sequence => write!(f, "sequence"),
            Self::Mapping => write!(f, "mapping"),
        }
    }
}

/// A resolved YAML value.
///
/// Collections hold [`NodeId`]s into the owning [`Document`]'s arena rather
/// than nested values, so subtrees can be shared (aliases) and cycles are
/// representable.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A null value (`null`, `~`, or empty).
    Null,

    /// A boolean value.
    Bool(bool),

    /// An integer value.
    Int(i64),

    /// A floating-point value.
    Float(f64),

    /// A string value (plain, quoted or block scalar).
    String(String),

    /// A sequence of nodes.
    Sequence(Vec<NodeId>),

    /// A mapping; pairs keep their insertion order and keys are unique
    /// unless duplicate keys were explicitly allowed.
    Mapping(Vec<(NodeId, NodeId)>),
}

impl Value {
    /// The structural kind of this value.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Null | Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::String(_) => {
                NodeKind::Scalar
            }
            Self::Sequence(_) => NodeKind::Sequence,
            Self::Mapping(_) => NodeKind::Mapping,
        }
    }

    /// Returns `true` if this is a null value.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if this is a scalar value.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self.kind(), NodeKind::Scalar)
    }

    /// Returns `true` if this is a sequence or mapping.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        !self.is_scalar()
    }
}

/// One fully resolved YAML document: a node arena plus its root.
///
/// Documents are independent of each other; anchors never cross document
/// boundaries. Equality between documents is structural and cycle-safe.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Value>,
    spans: Vec<Span>,
    root: NodeId,
}

impl Document {
    pub(crate) fn new(nodes: Vec<Value>, spans: Vec<Span>, root: NodeId) -> Self {
        debug_assert_eq!(nodes.len(), spans.len());
        Self { nodes, spans, root }
    }

    /// The document's root node.
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            doc: self,
            id: self.root,
        }
    }

    /// The value stored for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    #[must_use]
    pub fn value(&self, id: NodeId) -> &Value {
        &self.nodes[id.index()]
    }

    /// The source span recorded for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    #[must_use]
    pub fn span(&self, id: NodeId) -> Span {
        self.spans[id.index()]
    }

    /// Number of nodes in the arena (shared nodes count once).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// A [`NodeRef`] for `id`.
    #[must_use]
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { doc: self, id }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        let mut visited = HashSet::new();
        structural_eq(&self.nodes, self.root, &other.nodes, other.root, &mut visited)
    }
}

/// Cycle-safe structural equality between two arena nodes.
///
/// The visited set records pairs already under comparison; re-encountering a
/// pair means both sides closed a cycle at the same point, which counts as
/// equal (coinductive reading). Also used by the loader to compare mapping
/// keys within a single arena.
pub(crate) fn structural_eq(
    lhs: &[Value],
    a: NodeId,
    rhs: &[Value],
    b: NodeId,
    visited: &mut HashSet<(NodeId, NodeId)>,
) -> bool {
    let (Some(va), Some(vb)) = (lhs.get(a.index()), rhs.get(b.index())) else {
        return false;
    };
    match (va, vb) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Sequence(xs), Value::Sequence(ys)) => {
            if xs.len() != ys.len() {
                return false;
            }
            if !visited.insert((a, b)) {
                return true;
            }
            xs.iter()
                .zip(ys)
                .all(|(&x, &y)| structural_eq(lhs, x, rhs, y, visited))
        }
        (Value::Mapping(xs), Value::Mapping(ys)) => {
            if xs.len() != ys.len() {
                return false;
            }
            if !visited.insert((a, b)) {
                return true;
            }
            xs.iter().zip(ys).all(|(&(xk, xv), &(yk, yv))| {
                structural_eq(lhs, xk, rhs, yk, visited)
                    && structural_eq(lhs, xv, rhs, yv, visited)
            })
        }
        _ => false,
    }
}

/// A borrowed view of one node inside a [`Document`].
///
/// Bundles the document and a [`NodeId`] so callers can navigate collections
/// without threading the arena through every call.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'doc> {
    doc: &'doc Document,
    id: NodeId,
}

impl<'doc> NodeRef<'doc> {
    /// This node's id (stable identity within the document).
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The underlying value.
    #[must_use]
    pub fn value(&self) -> &'doc Value {
        self.doc.value(self.id)
    }

    /// The source span of this node.
    #[must_use]
    pub fn span(&self) -> Span {
        self.doc.span(self.id)
    }

    /// The structural kind of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.value().kind()
    }

    /// Returns `true` for a null node.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.value().is_null()
    }

    /// The string content, if this is a string node.
    #[must_use]
    pub fn as_str(&self) -> Option<&'doc str> {
        match self.value() {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The boolean content, if this is a bool node.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.value() {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer content, if this is an int node.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self.value() {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// The float content, if this is a float node.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self.value() {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Number of items (sequence) or pairs (mapping); 0 for scalars.
    #[must_use]
    pub fn len(&self) -> usize {
        match self.value() {
            Value::Sequence(items) => items.len(),
            Value::Mapping(pairs) => pairs.len(),
            _ => 0,
        }
    }

    /// Returns `true` if this node has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `index`-th item of a sequence.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<NodeRef<'doc>> {
        match self.value() {
            Value::Sequence(items) => items.get(index).map(|&id| self.doc.node(id)),
            _ => None,
        }
    }

    /// Look up a mapping value by string key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<NodeRef<'doc>> {
        match self.value() {
            Value::Mapping(pairs) => pairs.iter().find_map(|&(k, v)| {
                matches!(self.doc.value(k), Value::String(s) if s == key)
                    .then(|| self.doc.node(v))
            }),
            _ => None,
        }
    }

    /// Iterate over a sequence's items (empty for other kinds).
    pub fn items(&self) -> impl Iterator<Item = NodeRef<'doc>> + use<'doc> {
        let doc = self.doc;
        let items = match self.value() {
            Value::Sequence(items) => items.as_slice(),
            _ => &[],
        };
        items.iter().map(move |&id| doc.node(id))
    }

    /// Iterate over a mapping's pairs (empty for other kinds).
    pub fn entries(&self) -> impl Iterator<Item = (NodeRef<'doc>, NodeRef<'doc>)> + use<'doc> {
        let doc = self.doc;
        let pairs = match self.value() {
            Value::Mapping(pairs) => pairs.as_slice(),
            _ => &[],
        };
        pairs.iter().map(move |&(k, v)| (doc.node(k), doc.node(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chumsky::span::Span as _;

    fn span() -> Span {
        Span::new((), 0..0)
    }

    fn doc(nodes: Vec<Value>, root: u32) -> Document {
        let spans = vec![span(); nodes.len()];
        Document::new(nodes, spans, NodeId(root))
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(Value::Null.kind(), NodeKind::Scalar);
        assert_eq!(Value::Int(1).kind(), NodeKind::Scalar);
        assert_eq!(Value::Sequence(vec![]).kind(), NodeKind::Sequence);
        assert_eq!(Value::Mapping(vec![]).kind(), NodeKind::Mapping);
        assert!(Value::Mapping(vec![]).is_collection());
        assert!(Value::String(String::new()).is_scalar());
    }

    #[test]
    fn test_navigation() {
        // {a: 1, b: [true, null]}
        let document = doc(
            vec![
                Value::String("a".to_owned()),
                Value::Int(1),
                Value::String("b".to_owned()),
                Value::Bool(true),
                Value::Null,
                Value::Sequence(vec![NodeId(3), NodeId(4)]),
                Value::Mapping(vec![(NodeId(0), NodeId(1)), (NodeId(2), NodeId(5))]),
            ],
            6,
        );
        let root = document.root();
        assert_eq!(root.len(), 2);
        assert_eq!(root.get("a").and_then(|n| n.as_int()), Some(1));
        let seq = root.get("b").unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.item(0).and_then(|n| n.as_bool()), Some(true));
        assert!(seq.item(1).unwrap().is_null());
        assert!(root.get("missing").is_none());
        assert_eq!(root.entries().count(), 2);
    }

    #[test]
    fn test_structural_equality_ignores_node_ids() {
        // Same structure laid out in different arena orders.
        let left = doc(
            vec![
                Value::Int(1),
                Value::String("a".to_owned()),
                Value::Mapping(vec![(NodeId(1), NodeId(0))]),
            ],
            2,
        );
        let right = doc(
            vec![
                Value::Mapping(vec![(NodeId(1), NodeId(2))]),
                Value::String("a".to_owned()),
                Value::Int(1),
            ],
            0,
        );
        assert_eq!(left, right);
    }

    #[test]
    fn test_structural_inequality() {
        let left = doc(vec![Value::Sequence(vec![NodeId(1)]), Value::Int(1)], 0);
        let right = doc(vec![Value::Sequence(vec![NodeId(1)]), Value::Int(2)], 0);
        assert_ne!(left, right);
    }

    #[test]
    fn test_cyclic_equality_terminates() {
        // A sequence whose only element is itself.
        let left = doc(vec![Value::Sequence(vec![NodeId(0)])], 0);
        let right = doc(vec![Value::Sequence(vec![NodeId(0)])], 0);
        assert_eq!(left, right);

        // Cycle vs. non-cycle of the same shallow shape.
        let acyclic = doc(
            vec![Value::Sequence(vec![NodeId(1)]), Value::Null],
            0,
        );
        assert_ne!(left, acyclic);
    }

    #[test]
    fn test_shared_node_appears_once_in_arena() {
        // [x, x] where both items alias one node.
        let document = doc(
            vec![Value::Int(5), Value::Sequence(vec![NodeId(0), NodeId(0)])],
            1,
        );
        assert_eq!(document.node_count(), 2);
        let root = document.root();
        assert_eq!(root.item(0).unwrap().id(), root.item(1).unwrap().id());
    }
}
