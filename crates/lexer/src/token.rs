// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use crate::keywords::Keyword;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier(String),
    /// A backtick-quoted identifier; `String` is the already-unescaped content.
    QuotedIdentifier(String),
    IntegerLiteral(i64),
    FloatLiteral(f64),
    /// A single-quoted string literal; `String` is the already-unescaped content.
    StringLiteral(String),
    Variable { name: String, is_system_var: bool },
    /// The `?` bind parameter marker.
    Parameter,
    Op(String),
    LParen,
    RParen,
    Comma,
    Dot,
    Semicolon,
    Eof,
}

/// One lexed token plus its raw source slice, used for error messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Token {
        Token { kind, text: text.into() }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.kind, TokenKind::Keyword(k) if *k == keyword)
    }
}
