//! Query parse and compile errors

use charter_lexer::TokenKind;
use charter_syntax::Span;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("unexpected end of query")]
    UnexpectedEof { span: Span },

    /// An error-recovery node reached the compiler
    #[error("syntax error in query")]
    InvalidSyntax { span: Span },

    #[error("invalid {kind} literal: '{text}'")]
    InvalidLiteral {
        kind: String,
        text: String,
        span: Span,
    },

    #[error("malformed {kind} node")]
    MalformedNode { kind: String, span: Span },

    #[error("query nesting too deep")]
    TooDeep { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnexpectedEof { span } => *span,
            ParseError::InvalidSyntax { span } => *span,
            ParseError::InvalidLiteral { span, .. } => *span,
            ParseError::MalformedNode { span, .. } => *span,
            ParseError::TooDeep { span } => *span,
        }
    }

    pub fn unexpected(expected: impl Into<String>, found: TokenKind, span: Span) -> Self {
        ParseError::UnexpectedToken {
            expected: expected.into(),
            found: found.describe().to_string(),
            span,
        }
    }
}
