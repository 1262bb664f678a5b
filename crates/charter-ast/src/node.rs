//! Query AST nodes

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use charter_syntax::{Span, SyntaxKind};

use crate::{BinaryOperator, DateTimeValue};

/// A node in the compiled query AST
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryNode {
    pub kind: QueryNodeKind,
    /// Span of the syntax node this was compiled from
    pub span: Span,
}

impl QueryNode {
    pub fn new(kind: QueryNodeKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryNodeKind {
    /// Numeric literal text, parsed against the expected type at binding
    Number(String),

    /// String literal, quotes stripped and `''` unescaped
    Str(String),

    /// Decoded `guid'…'` literal
    Guid(Uuid),

    /// Decoded `datetime'…'` literal
    DateTime(DateTimeValue),

    /// `t'…'` literal; resolved to a resource type at binding
    TypeName(String),

    /// Identifier with optional path continuation: `Name`, `Owner.Name`
    Symbol {
        name: String,
        path: Vec<QueryNode>,
    },

    /// Binary operation: `a and b`, `Age gt 3`, `x.Name`
    Binary {
        op: BinaryOperator,
        left: Box<QueryNode>,
        right: Box<QueryNode>,
    },

    /// Logical negation: `not x`
    Not(Box<QueryNode>),

    /// Method call: `startswith(Name, 'Re')`
    MethodCall {
        name: String,
        args: Vec<QueryNode>,
    },

    /// Indexer access: `attributes['color']`
    IndexerAccess {
        name: String,
        args: Vec<QueryNode>,
    },

    /// Lambda: parameter symbol followed by the body
    Lambda(Vec<QueryNode>),

    /// Array literal: `['a', 'b']`
    Array(Vec<QueryNode>),

    /// Syntax the compiler does not recognize. Compilation is permissive
    /// so sibling subtrees survive; binding one of these is an error.
    Unhandled {
        kind: SyntaxKind,
    },
}
