//! Recursive descent parser producing query syntax trees
//!
//! The parser's output mirrors the historical grammar the compiler was
//! built against: `LambdaOp`, `Or`, `And` and `As` wrap their operand
//! even when no operator is present (the compiler unwraps singletons),
//! and consecutive uses of the same operator come out as one flat node
//! (the compiler folds them left-associatively). Precedence, loosest
//! first: lambda, or, and, not, comparisons and `in`, `as`, add/sub,
//! mul/div/mod, member access.

use charter_ast::SortDirection;
use charter_lexer::{Token, TokenKind};
use charter_syntax::{Span, SyntaxKind, SyntaxNode};

use crate::ParseError;

/// One `$orderby` clause: the expression tree and its direction.
/// Ascending clauses come wrapped in `OrderByAsc`.
#[derive(Debug, Clone)]
pub struct OrderClause {
    pub tree: SyntaxNode,
    pub direction: SortDirection,
}

pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    // === Utilities ===

    fn current(&self) -> Token {
        self.tokens
            .get(self.pos)
            .copied()
            .unwrap_or_else(|| *self.tokens.last().expect("tokens should have at least EOF"))
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn peek_ahead(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn consume(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(
                kind.describe(),
                self.peek(),
                self.current().span,
            ))
        }
    }

    fn text(&self, token: Token) -> &'a str {
        token.text(self.source)
    }

    fn span(&self) -> Span {
        self.current().span
    }

    // === Entry points ===

    /// Parse a complete filter expression into a `Root`-wrapped tree
    pub fn parse_query(&mut self) -> Result<SyntaxNode, ParseError> {
        let expr = self.parse_expr()?;
        self.consume(TokenKind::Eof)?;
        Ok(SyntaxNode::branch(SyntaxKind::Root, vec![expr]))
    }

    /// Parse a comma-separated `$orderby` clause list
    pub fn parse_order_clauses(&mut self) -> Result<Vec<OrderClause>, ParseError> {
        let mut clauses = Vec::new();
        loop {
            let expr = self.parse_expr()?;
            let direction = if self.at(TokenKind::Asc) {
                self.advance();
                SortDirection::Ascending
            } else if self.at(TokenKind::Desc) {
                self.advance();
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            let tree = match direction {
                SortDirection::Ascending => {
                    SyntaxNode::branch(SyntaxKind::OrderByAsc, vec![expr])
                }
                SortDirection::Descending => expr,
            };
            clauses.push(OrderClause { tree, direction });

            if self.at(TokenKind::Comma) {
                self.advance();
                continue;
            }
            self.consume(TokenKind::Eof)?;
            return Ok(clauses);
        }
    }

    // === Expression levels ===

    fn parse_expr(&mut self) -> Result<SyntaxNode, ParseError> {
        self.parse_lambda()
    }

    fn parse_lambda(&mut self) -> Result<SyntaxNode, ParseError> {
        let first = self.parse_or()?;
        let mut children = vec![first];
        if self.at(TokenKind::Colon) {
            self.advance();
            children.push(self.parse_lambda()?);
        }
        Ok(SyntaxNode::branch(SyntaxKind::LambdaOp, children))
    }

    fn parse_or(&mut self) -> Result<SyntaxNode, ParseError> {
        let mut children = vec![self.parse_and()?];
        while self.at(TokenKind::Or) {
            self.advance();
            children.push(self.parse_and()?);
        }
        Ok(SyntaxNode::branch(SyntaxKind::Or, children))
    }

    fn parse_and(&mut self) -> Result<SyntaxNode, ParseError> {
        let mut children = vec![self.parse_not()?];
        while self.at(TokenKind::And) {
            self.advance();
            children.push(self.parse_not()?);
        }
        Ok(SyntaxNode::branch(SyntaxKind::And, children))
    }

    fn parse_not(&mut self) -> Result<SyntaxNode, ParseError> {
        if self.at(TokenKind::Not) {
            self.advance();
            let operand = self.parse_not()?;
            return Ok(SyntaxNode::branch(SyntaxKind::Not, vec![operand]));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<SyntaxNode, ParseError> {
        const OPS: &[(TokenKind, SyntaxKind)] = &[
            (TokenKind::Eq, SyntaxKind::Eq),
            (TokenKind::Ne, SyntaxKind::Ne),
            (TokenKind::Gt, SyntaxKind::Gt),
            (TokenKind::Ge, SyntaxKind::Ge),
            (TokenKind::Lt, SyntaxKind::Lt),
            (TokenKind::Le, SyntaxKind::Le),
            (TokenKind::In, SyntaxKind::In),
        ];
        self.parse_op_runs(OPS, Self::parse_as)
    }

    fn parse_as(&mut self) -> Result<SyntaxNode, ParseError> {
        let mut children = vec![self.parse_additive()?];
        while self.at(TokenKind::As) {
            self.advance();
            children.push(self.parse_additive()?);
        }
        Ok(SyntaxNode::branch(SyntaxKind::As, children))
    }

    fn parse_additive(&mut self) -> Result<SyntaxNode, ParseError> {
        const OPS: &[(TokenKind, SyntaxKind)] = &[
            (TokenKind::Add, SyntaxKind::Add),
            (TokenKind::Sub, SyntaxKind::Sub),
        ];
        self.parse_op_runs(OPS, Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<SyntaxNode, ParseError> {
        const OPS: &[(TokenKind, SyntaxKind)] = &[
            (TokenKind::Mul, SyntaxKind::Mul),
            (TokenKind::Div, SyntaxKind::Div),
            (TokenKind::Mod, SyntaxKind::Mod),
        ];
        self.parse_op_runs(OPS, Self::parse_postfix)
    }

    /// Parse one precedence level: consecutive uses of the same operator
    /// collect into one flat node; a switch to a different operator at
    /// the same level nests the run built so far as the left operand.
    fn parse_op_runs(
        &mut self,
        ops: &[(TokenKind, SyntaxKind)],
        mut next: impl FnMut(&mut Self) -> Result<SyntaxNode, ParseError>,
    ) -> Result<SyntaxNode, ParseError> {
        let mut node = next(self)?;
        while let Some(&(token, kind)) = ops.iter().find(|(t, _)| self.at(*t)) {
            let mut children = vec![node];
            while self.at(token) {
                self.advance();
                children.push(next(self)?);
            }
            node = SyntaxNode::branch(kind, children);
        }
        Ok(node)
    }

    fn parse_postfix(&mut self) -> Result<SyntaxNode, ParseError> {
        let node = self.parse_primary()?;
        if !self.at(TokenKind::Dot) {
            return Ok(node);
        }
        let mut children = vec![node];
        while self.at(TokenKind::Dot) {
            self.advance();
            children.push(self.parse_primary()?);
        }
        Ok(SyntaxNode::branch(SyntaxKind::Dot, children))
    }

    fn parse_primary(&mut self) -> Result<SyntaxNode, ParseError> {
        match self.peek() {
            TokenKind::Int => Ok(self.leaf(SyntaxKind::Int)),
            TokenKind::Float => Ok(self.leaf(SyntaxKind::Float)),
            TokenKind::String => Ok(self.leaf(SyntaxKind::Str)),
            TokenKind::PrefixedString => Ok(self.leaf(SyntaxKind::PrefixedString)),
            TokenKind::Ident => match self.peek_ahead(1) {
                TokenKind::LParen => self.parse_method_call(),
                TokenKind::LBracket => self.parse_indexer_access(),
                _ => Ok(self.leaf(SyntaxKind::Id)),
            },
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.consume(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => self.parse_array_literal(),
            // Lexer garbage becomes an error-recovery node; the compiler
            // rejects it with the offending span attached.
            TokenKind::Error => Ok(self.leaf(SyntaxKind::Error)),
            TokenKind::Eof => Err(ParseError::UnexpectedEof { span: self.span() }),
            found => Err(ParseError::unexpected("expression", found, self.span())),
        }
    }

    /// Consume the current token into a leaf node of the given kind
    fn leaf(&mut self, kind: SyntaxKind) -> SyntaxNode {
        let token = self.advance();
        SyntaxNode::new(kind, token.text(self.source), token.span)
    }

    fn parse_method_call(&mut self) -> Result<SyntaxNode, ParseError> {
        let name_token = self.consume(TokenKind::Ident)?;
        let name = SyntaxNode::new(SyntaxKind::Id, self.text(name_token), name_token.span);
        self.consume(TokenKind::LParen)?;
        let mut children = vec![name];
        if !self.at(TokenKind::RParen) {
            children.push(self.parse_expr()?);
            while self.at(TokenKind::Comma) {
                self.advance();
                children.push(self.parse_expr()?);
            }
        }
        let close = self.consume(TokenKind::RParen)?.span;
        let span = name_token.span.merge(close);
        Ok(SyntaxNode::branch(SyntaxKind::MethodCall, children).with_span(span))
    }

    fn parse_indexer_access(&mut self) -> Result<SyntaxNode, ParseError> {
        let name_token = self.consume(TokenKind::Ident)?;
        let name = SyntaxNode::new(SyntaxKind::Id, self.text(name_token), name_token.span);
        self.consume(TokenKind::LBracket)?;
        let mut children = vec![name];
        children.push(self.parse_expr()?);
        while self.at(TokenKind::Comma) {
            self.advance();
            children.push(self.parse_expr()?);
        }
        let close = self.consume(TokenKind::RBracket)?.span;
        let span = name_token.span.merge(close);
        Ok(SyntaxNode::branch(SyntaxKind::IndexerAccess, children).with_span(span))
    }

    fn parse_array_literal(&mut self) -> Result<SyntaxNode, ParseError> {
        let open = self.consume(TokenKind::LBracket)?.span;
        let mut children = Vec::new();
        if !self.at(TokenKind::RBracket) {
            children.push(self.parse_expr()?);
            while self.at(TokenKind::Comma) {
                self.advance();
                children.push(self.parse_expr()?);
            }
        }
        let close = self.consume(TokenKind::RBracket)?.span;
        Ok(SyntaxNode::branch(SyntaxKind::ArrayLiteral, children).with_span(open.merge(close)))
    }
}
