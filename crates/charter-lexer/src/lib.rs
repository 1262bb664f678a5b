//! Charter Lexer - query text tokenization using logos
//!
//! Tokenizes the word-operator query dialect: `Name eq 'Rex' and Age gt 3`.
//! Prefixed literals like `guid'…'` and `datetime'…'` are single tokens;
//! their decoding happens in the tree compiler, not here.

mod token;

pub use token::*;

use charter_syntax::Span;
use logos::Logos;

/// Tokenize a query string into a vector of tokens
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        let kind = match result {
            Ok(kind) => kind,
            Err(_) => TokenKind::Error,
        };
        tokens.push(Token { kind, span });
    }

    // Add EOF token
    let end = source.len();
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(end, end),
    });

    tokens
}

/// A token with its span
#[derive(Debug, Clone, Copy)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_operators() {
        let tokens = tokenize("Name eq 'Rex' and Age gt 3");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Eq,
                TokenKind::String,
                TokenKind::And,
                TokenKind::Ident,
                TokenKind::Gt,
                TokenKind::Int,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_prefixed_literal_beats_identifier() {
        let source = "guid'd17d3dfd-07d7-4cf6-bf99-2f44b1c7ec11'";
        let tokens = tokenize(source);
        assert_eq!(tokens[0].kind, TokenKind::PrefixedString);
        assert_eq!(tokens[0].text(source), source);
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_doubled_quote_stays_one_string() {
        let source = "'it''s' and 'b'";
        let tokens = tokenize(source);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text(source), "'it''s'");
        assert_eq!(tokens[1].kind, TokenKind::And);
        assert_eq!(tokens[2].kind, TokenKind::String);
    }

    #[test]
    fn test_numbers_and_dots() {
        let tokens = tokenize("price mul 1.5 ge -2");
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[1].kind, TokenKind::Mul);
        assert_eq!(tokens[2].kind, TokenKind::Float);
        assert_eq!(tokens[3].kind, TokenKind::Ge);
        assert_eq!(tokens[4].kind, TokenKind::Int);

        let tokens = tokenize("owner.name");
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[1].kind, TokenKind::Dot);
        assert_eq!(tokens[2].kind, TokenKind::Ident);
    }

    #[test]
    fn test_true_false_null_are_identifiers() {
        let tokens = tokenize("deleted eq false");
        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[1].kind, TokenKind::Eq);
        assert_eq!(tokens[2].kind, TokenKind::Ident);
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let tokens = tokenize("name eq 'oops");
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Error));
    }
}
