//! Node type tags for query syntax trees

use serde::{Deserialize, Serialize};

/// The type tag of a [`SyntaxNode`](crate::SyntaxNode).
///
/// Front-ends may produce any of these; the downstream compiler decides
/// what each one means. `Error` is the error-recovery placeholder some
/// front-ends emit for unparseable regions and is always rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyntaxKind {
    /// Error-recovery placeholder; never compiles
    Error,
    /// Wrapper around the entire query expression
    Root,
    /// Identifier, optionally with path-continuation children
    Id,
    /// Integer literal text
    Int,
    /// Fractional literal text
    Float,
    /// Single-quoted string literal (text includes the quotes)
    Str,
    /// `prefix'value'` literal, e.g. `guid'…'` or `datetime'…'`
    PrefixedString,
    /// First child names the method, remaining children are arguments
    MethodCall,
    /// First child names the member, remaining children are keys
    IndexerAccess,
    /// Lambda wrapper; one child for a plain expression, two for `param: body`
    LambdaOp,
    ArrayLiteral,
    Not,
    And,
    Or,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Dot,
    As,
    In,
    /// Ascending order-by clause wrapper
    OrderByAsc,
}

impl SyntaxKind {
    /// Human-readable description for error messages
    pub fn describe(&self) -> &'static str {
        match self {
            SyntaxKind::Error => "error node",
            SyntaxKind::Root => "query root",
            SyntaxKind::Id => "identifier",
            SyntaxKind::Int => "integer literal",
            SyntaxKind::Float => "fractional literal",
            SyntaxKind::Str => "string literal",
            SyntaxKind::PrefixedString => "prefixed literal",
            SyntaxKind::MethodCall => "method call",
            SyntaxKind::IndexerAccess => "indexer access",
            SyntaxKind::LambdaOp => "lambda",
            SyntaxKind::ArrayLiteral => "array literal",
            SyntaxKind::Not => "'not' operator",
            SyntaxKind::And => "'and' operator",
            SyntaxKind::Or => "'or' operator",
            SyntaxKind::Eq => "'eq' operator",
            SyntaxKind::Ne => "'ne' operator",
            SyntaxKind::Gt => "'gt' operator",
            SyntaxKind::Ge => "'ge' operator",
            SyntaxKind::Lt => "'lt' operator",
            SyntaxKind::Le => "'le' operator",
            SyntaxKind::Add => "'add' operator",
            SyntaxKind::Sub => "'sub' operator",
            SyntaxKind::Mul => "'mul' operator",
            SyntaxKind::Div => "'div' operator",
            SyntaxKind::Mod => "'mod' operator",
            SyntaxKind::Dot => "member access",
            SyntaxKind::As => "'as' operator",
            SyntaxKind::In => "'in' operator",
            SyntaxKind::OrderByAsc => "order-by clause",
        }
    }
}
