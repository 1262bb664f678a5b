//! Token definitions for query text

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")] // Skip whitespace
pub enum TokenKind {
    // === Word operators ===
    // All operators are words; `true`, `false` and `null` are plain
    // identifiers resolved later.
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("eq")]
    Eq,
    #[token("ne")]
    Ne,
    #[token("gt")]
    Gt,
    #[token("ge")]
    Ge,
    #[token("lt")]
    Lt,
    #[token("le")]
    Le,
    #[token("add")]
    Add,
    #[token("sub")]
    Sub,
    #[token("mul")]
    Mul,
    #[token("div")]
    Div,
    #[token("mod")]
    Mod,
    #[token("as")]
    As,
    #[token("in")]
    In,

    // Order-by directions
    #[token("asc")]
    Asc,
    #[token("desc")]
    Desc,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // === Punctuation ===
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,

    // === Literals ===
    #[regex(r"-?[0-9]+", priority = 2)]
    Int,

    #[regex(r"-?[0-9]+\.[0-9]+")]
    Float,

    /// Single-quoted string; embedded quotes are doubled: `'it''s'`
    #[regex(r"'([^']|'')*'")]
    String,

    /// `prefix'value'` literal such as `guid'…'`, `datetime'…'`, `t'…'`
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*'([^']|'')*'")]
    PrefixedString,

    // === Identifiers ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    // === Special ===
    Error,
    Eof,
}

impl TokenKind {
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::Not => "'not'",
            TokenKind::Eq => "'eq'",
            TokenKind::Ne => "'ne'",
            TokenKind::Gt => "'gt'",
            TokenKind::Ge => "'ge'",
            TokenKind::Lt => "'lt'",
            TokenKind::Le => "'le'",
            TokenKind::Add => "'add'",
            TokenKind::Sub => "'sub'",
            TokenKind::Mul => "'mul'",
            TokenKind::Div => "'div'",
            TokenKind::Mod => "'mod'",
            TokenKind::As => "'as'",
            TokenKind::In => "'in'",
            TokenKind::Asc => "'asc'",
            TokenKind::Desc => "'desc'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Dot => "'.'",
            TokenKind::Int => "integer",
            TokenKind::Float => "number",
            TokenKind::String => "string",
            TokenKind::PrefixedString => "prefixed literal",
            TokenKind::Ident => "identifier",
            TokenKind::Error => "error",
            TokenKind::Eof => "end of query",
        }
    }
}
