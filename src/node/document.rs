//! Document type and related utilities
//!
//! The root container for parsed node trees, with query and traversal APIs.

use crate::error::{CompositeError, CompositeResult};

use super::{Node, NodeKind};

// =============================================================================
// Document
// =============================================================================

/// Root document container
#[derive(Debug, Clone)]
pub struct Document {
    /// Root node (a `document` node, or the parser's synthetic root)
    pub root: Node,
}

impl Document {
    /// Create a new document with a root node
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Build a document from a preamble and a body
    pub fn from_parts(preamble: Node, body: Node) -> Self {
        Self::new(Node::new(NodeKind::Document).child(preamble).child(body))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query API
    // ─────────────────────────────────────────────────────────────────────────

    /// Find first node of the given kind (depth-first search)
    pub fn find_first(&self, kind: &NodeKind) -> Option<&Node> {
        self.iter().find(|node| node.is(kind))
    }

    /// Find first node matching predicate (depth-first search)
    pub fn find<F>(&self, predicate: F) -> Option<&Node>
    where
        F: Fn(&Node) -> bool,
    {
        self.iter().find(|node| predicate(node))
    }

    /// Find all nodes matching predicate
    pub fn find_all<F>(&self, predicate: F) -> Vec<&Node>
    where
        F: Fn(&Node) -> bool,
    {
        self.iter().filter(|node| predicate(node)).collect()
    }

    /// The `preambule` node
    pub fn preamble(&self) -> CompositeResult<&Node> {
        self.find_first(&NodeKind::Preamble)
            .ok_or(CompositeError::MissingNode("preambule"))
    }

    /// The `body` node
    pub fn body(&self) -> CompositeResult<&Node> {
        self.find_first(&NodeKind::Body)
            .ok_or(CompositeError::MissingNode("body"))
    }

    /// Slide nodes of the body, in order
    pub fn slides(&self) -> impl Iterator<Item = &Node> {
        self.body()
            .ok()
            .into_iter()
            .flat_map(|body| body.children.iter())
            .filter(|node| node.is(&NodeKind::Slide))
    }

    /// Number of slide nodes in the body
    pub fn slide_count(&self) -> usize {
        self.slides().count()
    }

    /// Count total nodes in document
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Iterate over all nodes (depth-first, document order)
    pub fn iter(&self) -> NodeIterator<'_> {
        NodeIterator::new(&self.root)
    }
}

// =============================================================================
// NodeIterator - depth-first traversal
// =============================================================================

/// Depth-first iterator over nodes
pub struct NodeIterator<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> NodeIterator<'a> {
    /// Start a traversal at `root` (inclusive)
    pub fn new(root: &'a Node) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for NodeIterator<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order so they're visited left-to-right
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let preamble = Node::new(NodeKind::Preamble)
            .child(Node::new(NodeKind::Title).child(Node::text("Talk")));
        let body = Node::new(NodeKind::Body)
            .child(Node::new(NodeKind::Slide).child(Node::text("one")))
            .child(Node::new(NodeKind::Author).child(Node::text("Me")))
            .child(Node::new(NodeKind::Slide).child(Node::text("two")));
        Document::from_parts(preamble, body)
    }

    #[test]
    fn test_document_parts() {
        let doc = sample();
        assert!(doc.preamble().is_ok());
        assert!(doc.body().is_ok());
        assert_eq!(doc.slide_count(), 2);
    }

    #[test]
    fn test_missing_parts() {
        let doc = Document::new(Node::new(NodeKind::Document));
        assert!(matches!(doc.preamble(), Err(CompositeError::MissingNode("preambule"))));
        assert!(matches!(doc.body(), Err(CompositeError::MissingNode("body"))));
        assert_eq!(doc.slide_count(), 0);
    }

    #[test]
    fn test_iteration_order() {
        let doc = sample();
        let texts: Vec<_> = doc.iter().filter_map(|n| n.content()).collect();
        assert_eq!(texts, vec!["Talk", "one", "Me", "two"]);
        assert_eq!(doc.node_count(), 11);
    }

    #[test]
    fn test_find() {
        let doc = sample();
        let author = doc.find_first(&NodeKind::Author).unwrap();
        assert_eq!(author.text_content(), "Me");
        assert_eq!(doc.find_all(|n| n.is(&NodeKind::Slide)).len(), 2);
        assert!(doc.find(|n| n.content() == Some("two")).is_some());
    }
}
