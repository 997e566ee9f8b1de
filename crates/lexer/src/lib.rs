// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Dialect-aware tokenizer. `tokenize(text, dialect)` eagerly produces the
//! full `Vec<Token>` (see `SPEC_FULL.md` §4.1) so the parser can freely
//! backtrack/lookahead across clause boundaries.

pub mod keywords;
pub mod token;

pub use keywords::Keyword;
pub use token::{Token, TokenKind};

use mindsdb_sql_ast::Dialect;

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct LexError {
    pub message: String,
}

impl LexError {
    pub fn new(message: impl Into<String>) -> LexError {
        LexError { message: message.into() }
    }
}

struct Lexer<'a> {
    dialect: Dialect,
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str, dialect: Dialect) -> Lexer<'a> {
        Lexer { dialect, chars: source.chars().collect(), pos: 0, source }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('-') if self.peek_at(1) == Some('-') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_backtick_identifier(&mut self) -> Result<String, LexError> {
        self.advance(); // opening backtick
        let mut out = String::new();
        loop {
            match self.advance() {
                Some('`') => {
                    if self.peek() == Some('`') {
                        out.push('`');
                        self.advance();
                    } else {
                        return Ok(out);
                    }
                }
                Some(c) => out.push(c),
                None => return Err(LexError::new("unterminated backtick-quoted identifier")),
            }
        }
    }

    fn lex_string_literal(&mut self) -> Result<String, LexError> {
        self.advance(); // opening quote
        let mut out = String::new();
        loop {
            match self.advance() {
                Some('\'') => {
                    if self.peek() == Some('\'') {
                        out.push('\'');
                        self.advance();
                    } else {
                        return Ok(out);
                    }
                }
                Some(c) => out.push(c),
                None => return Err(LexError::new("unterminated string literal")),
            }
        }
    }

    fn lex_number(&mut self) -> Token {
        let start = self.pos;
        while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            self.advance();
        }
        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_at(1).map(|c| c.is_ascii_digit()).unwrap_or(false) {
            is_float = true;
            self.advance();
            while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let save = self.pos;
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            if self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                is_float = true;
                while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                    self.advance();
                }
            } else {
                self.pos = save;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        if is_float {
            Token::new(TokenKind::FloatLiteral(text.parse().unwrap_or(0.0)), text)
        } else {
            Token::new(TokenKind::IntegerLiteral(text.parse().unwrap_or(0)), text)
        }
    }

    fn lex_word(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek()
            .map(|c| c.is_ascii_alphanumeric() || c == '_')
            .unwrap_or(false)
        {
            self.advance();
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        match keywords::lookup(self.dialect, &text) {
            Some(kw) => Token::new(TokenKind::Keyword(kw), text),
            None => Token::new(TokenKind::Identifier(text.clone()), text),
        }
    }

    fn lex_variable(&mut self) -> Token {
        let start = self.pos;
        self.advance(); // first '@'
        let is_system_var = self.peek() == Some('@');
        if is_system_var {
            self.advance();
        }
        let name_start = self.pos;
        while self
            .peek()
            .map(|c| c.is_ascii_alphanumeric() || c == '_')
            .unwrap_or(false)
        {
            self.advance();
        }
        let name: String = self.chars[name_start..self.pos].iter().collect();
        let text: String = self.chars[start..self.pos].iter().collect();
        Token::new(TokenKind::Variable { name, is_system_var }, text)
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace_and_comments();
        let Some(c) = self.peek() else { return Ok(None) };

        if c == '`' {
            let ident = self.lex_backtick_identifier()?;
            return Ok(Some(Token::new(TokenKind::QuotedIdentifier(ident.clone()), ident)));
        }
        if c == '\'' {
            let s = self.lex_string_literal()?;
            return Ok(Some(Token::new(TokenKind::StringLiteral(s.clone()), s)));
        }
        if c.is_ascii_digit() {
            return Ok(Some(self.lex_number()));
        }
        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(Some(self.lex_word()));
        }
        if c == '@' && self.dialect.has_variables() {
            return Ok(Some(self.lex_variable()));
        }

        let two_char = self.peek_at(1).map(|n| format!("{c}{n}"));
        if let Some(op) = two_char.as_deref() {
            if matches!(op, "!=" | "<>" | "<=" | ">=") {
                self.advance();
                self.advance();
                return Ok(Some(Token::new(TokenKind::Op(op.to_string()), op.to_string())));
            }
        }

        self.advance();
        match c {
            '=' | '<' | '>' | '+' | '-' | '*' | '/' | '%' => {
                Ok(Some(Token::new(TokenKind::Op(c.to_string()), c.to_string())))
            }
            '(' => Ok(Some(Token::new(TokenKind::LParen, "("))),
            ')' => Ok(Some(Token::new(TokenKind::RParen, ")"))),
            ',' => Ok(Some(Token::new(TokenKind::Comma, ","))),
            '.' => Ok(Some(Token::new(TokenKind::Dot, "."))),
            ';' => Ok(Some(Token::new(TokenKind::Semicolon, ";"))),
            '?' => Ok(Some(Token::new(TokenKind::Parameter, "?"))),
            other => Err(LexError::new(format!("unrecognized character '{other}'"))),
        }
    }
}

/// Produce the full token stream for `text` under `dialect`. Trailing
/// whitespace/comments are consumed; the stream does not include an explicit
/// EOF token (callers index past the end to detect it).
pub fn tokenize(text: &str, dialect: Dialect) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(text, dialect);
    let mut tokens = Vec::new();
    while let Some(tok) = lexer.next_token()? {
        tracing::trace!(target: "sql_lexer", kind = ?tok.kind, "token");
        tokens.push(tok);
    }
    let _ = lexer.source;
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_set_autocommit() {
        let tokens = tokenize("set autocommit", Dialect::Sqlite).unwrap();
        assert_eq!(tokens.len(), 2);
        assert!(tokens[0].is_keyword(Keyword::Set));
        assert_eq!(tokens[1].kind, TokenKind::Identifier("autocommit".to_string()));
    }

    #[test]
    fn tokenizes_backtick_identifier_with_escape() {
        let tokens = tokenize("`a``b`", Dialect::MySql).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::QuotedIdentifier("a`b".to_string()));
    }

    #[test]
    fn tokenizes_string_literal_with_doubled_quote_escape() {
        let tokens = tokenize("'it''s'", Dialect::Sqlite).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral("it's".to_string()));
    }

    #[test]
    fn doubled_backtick_inside_string_is_not_an_escape() {
        let tokens = tokenize("'a``b'", Dialect::MySql).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral("a``b".to_string()));
    }

    #[test]
    fn tokenizes_mysql_system_variable() {
        let tokens = tokenize("@@version", Dialect::MySql).unwrap();
        assert_eq!(
            tokens[0].kind,
            TokenKind::Variable { name: "version".to_string(), is_system_var: true }
        );
    }

    #[test]
    fn sqlite_does_not_lex_at_as_variable() {
        let err = tokenize("@version", Dialect::Sqlite).unwrap_err();
        assert!(err.message.contains("unrecognized character"));
    }

    #[test]
    fn tokenizes_comparison_operators() {
        let tokens = tokenize("a <= b != c", Dialect::Sqlite).unwrap();
        let ops: Vec<&str> = tokens
            .iter()
            .filter_map(|t| match &t.kind {
                TokenKind::Op(o) => Some(o.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(ops, vec!["<=", "!="]);
    }

    #[test]
    fn tokenizes_limit_offset_pair() {
        let tokens = tokenize("LIMIT 2, 1", Dialect::Sqlite).unwrap();
        assert!(tokens[0].is_keyword(Keyword::Limit));
        assert_eq!(tokens[1].kind, TokenKind::IntegerLiteral(2));
        assert_eq!(tokens[2].kind, TokenKind::Comma);
        assert_eq!(tokens[3].kind, TokenKind::IntegerLiteral(1));
    }
}
