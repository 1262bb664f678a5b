//! The syntax tree shape handed to the query compiler

use serde::{Deserialize, Serialize};

use crate::{Span, SyntaxKind};

/// A node in a query syntax tree.
///
/// Trees are built once by a front-end, never mutated, and consumed
/// top-down. Only four things about a node matter downstream: its kind,
/// its text, its ordered children, and its span back into the query
/// string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    /// Leaf text (identifier name, literal text); empty on operator nodes
    pub text: String,
    pub children: Vec<SyntaxNode>,
    pub span: Span,
}

impl SyntaxNode {
    pub fn new(kind: SyntaxKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            children: Vec::new(),
            span,
        }
    }

    /// Leaf with a dummy span, for hand-built trees in tests and adapters
    pub fn leaf(kind: SyntaxKind, text: impl Into<String>) -> Self {
        Self::new(kind, text, Span::dummy())
    }

    /// Interior node; span covers all children
    pub fn branch(kind: SyntaxKind, children: Vec<SyntaxNode>) -> Self {
        let span = children
            .iter()
            .map(|c| c.span)
            .reduce(Span::merge)
            .unwrap_or_default();
        Self {
            kind,
            text: String::new(),
            children,
            span,
        }
    }

    pub fn with_children(mut self, children: Vec<SyntaxNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn first_child(&self) -> Option<&SyntaxNode> {
        self.children.first()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_span_covers_children() {
        let a = SyntaxNode::new(SyntaxKind::Id, "a", Span::new(0, 1));
        let b = SyntaxNode::new(SyntaxKind::Id, "b", Span::new(7, 8));
        let node = SyntaxNode::branch(SyntaxKind::Dot, vec![a, b]);
        assert_eq!(node.span, Span::new(0, 8));
        assert_eq!(node.child_count(), 2);
        assert!(node.text.is_empty());
    }

    #[test]
    fn branch_without_children_gets_dummy_span() {
        let node = SyntaxNode::branch(SyntaxKind::ArrayLiteral, vec![]);
        assert_eq!(node.span, Span::dummy());
    }
}
