//! Document node model.
//!
//! The upstream parser produces a tree of [`Node`]s: a type tag, an optional
//! overlay specification, free-form extra parameters, an optional payload and
//! ordered children. The tree is read-only while compositing.
//!
//! # Example
//!
//! ```
//! use beamer_passes::node::{Node, NodeKind};
//!
//! let slide = Node::new(NodeKind::Slide)
//!     .child(Node::text("Hello "))
//!     .child(Node::new(NodeKind::Pause))
//!     .child(Node::text("World"));
//!
//! assert_eq!(slide.len(), 3);
//! assert_eq!(slide.text_content(), "Hello World");
//! ```

mod document;
mod kind;

pub use document::{Document, NodeIterator};
pub use kind::{FontSize, NodeKind};

use compact_str::CompactString;

use crate::overlay::Overlay;

/// Child collection.
///
/// A plain `Vec`: nodes own their children inline, so an inline-array
/// small vector would make the type infinitely sized.
pub type Children = Vec<Node>;

/// Leaf payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(CompactString),
    Number(f64),
}

impl Payload {
    /// Textual view of the payload.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(s) => Some(s),
            Payload::Number(_) => None,
        }
    }

    /// Numeric view of the payload, parsing text when needed.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Payload::Number(n) => Some(*n),
            Payload::Text(s) => s.trim().parse().ok(),
        }
    }
}

// =============================================================================
// Node
// =============================================================================

/// Parsed document node.
#[derive(Debug, Clone)]
pub struct Node {
    /// Node type
    pub kind: NodeKind,
    /// Overlay specification (`<...>`), empty if none
    pub overlay: Overlay,
    /// Extra (optional) parameters (`[...]`)
    pub params: CompactString,
    /// Leaf payload
    pub payload: Option<Payload>,
    /// Ordered children
    pub children: Children,
}

impl Node {
    /// Create an empty node of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            overlay: Overlay::default(),
            params: CompactString::default(),
            payload: None,
            children: Vec::new(),
        }
    }

    /// Create a node from a parser tag.
    pub fn tagged(tag: &str) -> Self {
        Self::new(NodeKind::from_tag(tag))
    }

    /// Create a `string` leaf.
    pub fn text(content: impl Into<CompactString>) -> Self {
        Self::new(NodeKind::Text).with_payload(Payload::Text(content.into()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder
    // ─────────────────────────────────────────────────────────────────────────

    /// Set the overlay specification.
    pub fn with_overlay(mut self, spec: impl Into<CompactString>) -> Self {
        self.overlay = Overlay::new(spec);
        self
    }

    /// Set the extra parameters.
    pub fn with_params(mut self, params: impl Into<CompactString>) -> Self {
        self.params = params.into();
        self
    }

    /// Set the payload.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Set a text payload.
    pub fn with_content(self, content: impl Into<CompactString>) -> Self {
        self.with_payload(Payload::Text(content.into()))
    }

    /// Append a child.
    pub fn child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }

    /// Append several children.
    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    /// Push a child in place.
    pub fn push(&mut self, node: Node) {
        self.children.push(node);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Check the node kind.
    #[inline]
    pub fn is(&self, kind: &NodeKind) -> bool {
        &self.kind == kind
    }

    /// Text payload, if any.
    pub fn content(&self) -> Option<&str> {
        self.payload.as_ref().and_then(Payload::as_text)
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Check if the node has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// First direct child of the given kind.
    pub fn first_child(&self, kind: &NodeKind) -> Option<&Node> {
        self.children.iter().find(|c| c.is(kind))
    }

    /// Concatenated text payloads of this subtree (document order).
    pub fn text_content(&self) -> String {
        let mut buf = String::new();
        for node in NodeIterator::new(self) {
            if node.is(&NodeKind::Text)
                && let Some(text) = node.content()
            {
                buf.push_str(text);
            }
        }
        buf
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::text(text)
    }
}
