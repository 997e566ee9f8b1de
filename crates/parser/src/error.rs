// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! The parser's single error type. See `SPEC_FULL.md` §2A.2 for why this is
//! a flat message-carrying variant rather than a richer, severity-tagged
//! error enum.

use mindsdb_sql_lexer::LexError;

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ParsingException {
    pub message: String,
}

impl ParsingException {
    pub fn new(message: impl Into<String>) -> ParsingException {
        ParsingException { message: message.into() }
    }
}

impl From<LexError> for ParsingException {
    fn from(err: LexError) -> ParsingException {
        ParsingException::new(err.message)
    }
}

pub type ParseResult<T> = Result<T, ParsingException>;
