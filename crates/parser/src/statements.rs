// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Non-`SELECT` top-level statements: `SET`, `USE`, transaction control,
//! `EXPLAIN`, `ALTER TABLE`, and the mindsdb predictor DDL.

use mindsdb_sql_ast::{
    AlterTable, CreatePredictor, Dialect, DropPredictor, Explain, Expr, RetrainPredictor, Set,
    Statement, Use,
};
use mindsdb_sql_lexer::{Keyword, TokenKind};

use crate::error::ParseResult;
use crate::parser::Parser;

impl Parser {
    /// `SET autocommit`, `SET NAMES utf8`, or `SET k = v`.
    pub(crate) fn parse_set(&mut self) -> ParseResult<Statement> {
        self.expect_keyword(Keyword::Set)?;
        if self.match_keyword(Keyword::Names) {
            let ident = self.parse_identifier()?;
            return Ok(Statement::Set(Set::names(ident)));
        }

        // `parse_expr` already folds `a = b` into a `BinaryOperation` via the
        // comparison precedence level, so an assignment comes back whole.
        let checkpoint = self.pos;
        if let Ok((name, false)) = self.parse_identifier_segment() {
            if !self.check_op("=") {
                return Ok(Statement::Set(Set::category(name)));
            }
        }
        self.pos = checkpoint;
        let expr = self.parse_expr()?;
        Ok(Statement::Set(Set::assignment(expr)))
    }

    /// `USE db_name` (mindsdb dialect only).
    pub(crate) fn parse_use(&mut self) -> ParseResult<Statement> {
        self.expect_keyword(Keyword::Use)?;
        let ident = self.parse_identifier()?;
        Ok(Statement::Use(Use::new(ident)))
    }

    pub(crate) fn parse_start_transaction(&mut self) -> ParseResult<Statement> {
        self.expect_keyword(Keyword::Start)?;
        self.expect_keyword(Keyword::Transaction)?;
        Ok(Statement::StartTransaction)
    }

    pub(crate) fn parse_commit(&mut self) -> ParseResult<Statement> {
        self.expect_keyword(Keyword::Commit)?;
        Ok(Statement::CommitTransaction)
    }

    pub(crate) fn parse_rollback(&mut self) -> ParseResult<Statement> {
        self.expect_keyword(Keyword::Rollback)?;
        Ok(Statement::RollbackTransaction)
    }

    pub(crate) fn parse_explain(&mut self) -> ParseResult<Statement> {
        self.expect_keyword(Keyword::Explain)?;
        let target = self.parse_identifier()?;
        Ok(Statement::Explain(Explain { target }))
    }

    /// `ALTER TABLE t (DISABLE|ENABLE) KEYS`.
    pub(crate) fn parse_alter_table(&mut self) -> ParseResult<Statement> {
        self.expect_keyword(Keyword::Alter)?;
        self.expect_keyword(Keyword::Table)?;
        let target = self.parse_identifier()?;
        let arg = if self.match_keyword(Keyword::Disable) {
            self.expect_keyword(Keyword::Keys)?;
            "disable keys".to_string()
        } else if self.match_keyword(Keyword::Enable) {
            self.expect_keyword(Keyword::Keys)?;
            "enable keys".to_string()
        } else {
            return Err(self.error("expected DISABLE KEYS or ENABLE KEYS"));
        };
        Ok(Statement::AlterTable(AlterTable { target, arg }))
    }

    pub(crate) fn parse_drop_predictor(&mut self) -> ParseResult<Statement> {
        self.expect_keyword(Keyword::Drop)?;
        self.expect_keyword(Keyword::Predictor)?;
        let name = self.parse_identifier()?;
        Ok(Statement::DropPredictor(DropPredictor { name }))
    }

    pub(crate) fn parse_retrain(&mut self) -> ParseResult<Statement> {
        self.expect_keyword(Keyword::Retrain)?;
        let name = self.parse_identifier()?;
        Ok(Statement::RetrainPredictor(RetrainPredictor { name }))
    }

    /// `CREATE [OR REPLACE] PREDICTOR name FROM integration (query) PREDICT
    /// col [ORDER BY col] [GROUP BY col] [WINDOW n] [USING k=v, ...]`.
    pub(crate) fn parse_create_predictor(&mut self) -> ParseResult<Statement> {
        self.expect_keyword(Keyword::Create)?;
        let or_replace = if self.match_keyword(Keyword::Or) {
            self.expect_keyword(Keyword::Replace)?;
            true
        } else {
            false
        };
        self.expect_keyword(Keyword::Predictor)?;
        let name = self.parse_identifier()?;

        let mut from_integration = None;
        let mut from_query = None;
        if self.match_keyword(Keyword::From) {
            from_integration = Some(self.parse_identifier()?);
            self.expect_kind(TokenKind::LParen, "'(' opening predictor training query")?;
            from_query = Some(self.parse_select_body()?);
            self.expect_kind(TokenKind::RParen, "')' closing predictor training query")?;
        }

        self.expect_keyword(Keyword::Predict)?;
        let mut predict = vec![self.parse_identifier()?];
        while self.match_kind(&TokenKind::Comma) {
            predict.push(self.parse_identifier()?);
        }

        let mut order_by = None;
        let mut group_by = None;
        let mut window = None;
        let mut using = Vec::new();

        if self.match_keyword(Keyword::Order) {
            self.expect_keyword(Keyword::By)?;
            order_by = Some(self.parse_identifier()?);
        }
        if self.match_keyword(Keyword::Group) {
            self.expect_keyword(Keyword::By)?;
            group_by = Some(self.parse_identifier()?);
        }
        if self.match_keyword(Keyword::Window) {
            window = Some(self.parse_window_size()?);
        }
        if self.match_keyword(Keyword::Using) {
            using.push(self.parse_using_pair()?);
            while self.match_kind(&TokenKind::Comma) {
                using.push(self.parse_using_pair()?);
            }
        }

        Ok(Statement::CreatePredictor(CreatePredictor {
            name,
            or_replace,
            from_query,
            from_integration,
            predict,
            order_by,
            group_by,
            window,
            using,
        }))
    }

    fn parse_window_size(&mut self) -> ParseResult<i64> {
        match self.advance() {
            Some(tok) => match tok.kind {
                TokenKind::IntegerLiteral(n) => Ok(n),
                _ => Err(self.error("WINDOW requires an integer size")),
            },
            None => Err(self.error("WINDOW requires an integer size")),
        }
    }

    fn parse_using_pair(&mut self) -> ParseResult<(String, Expr)> {
        let (key, _) = self.parse_identifier_segment()?;
        self.expect_op_eq()?;
        let value = self.parse_expr()?;
        Ok((key, value))
    }

    fn expect_op_eq(&mut self) -> ParseResult<()> {
        if self.match_op("=") {
            Ok(())
        } else {
            Err(self.error("expected '=' in USING clause"))
        }
    }
}

/// Dispatches on the leading keyword to the matching statement parser, or
/// `parse_select_body` when none of the non-`SELECT` forms apply.
pub(crate) fn parse_statement(parser: &mut Parser) -> ParseResult<Statement> {
    let is_mindsdb = parser.dialect() == Dialect::MindsDb;

    if parser.check_keyword(Keyword::Select) {
        return Ok(Statement::Select(parser.parse_select_body()?));
    }
    if parser.check_keyword(Keyword::Set) {
        return parser.parse_set();
    }
    if is_mindsdb && parser.check_keyword(Keyword::Use) {
        return parser.parse_use();
    }
    if parser.check_keyword(Keyword::Start) {
        return parser.parse_start_transaction();
    }
    if parser.check_keyword(Keyword::Commit) {
        return parser.parse_commit();
    }
    if parser.check_keyword(Keyword::Rollback) {
        return parser.parse_rollback();
    }
    if parser.check_keyword(Keyword::Explain) {
        return parser.parse_explain();
    }
    if parser.check_keyword(Keyword::Alter) {
        return parser.parse_alter_table();
    }
    if is_mindsdb && parser.check_keyword(Keyword::Drop) {
        return parser.parse_drop_predictor();
    }
    if is_mindsdb && parser.check_keyword(Keyword::Retrain) {
        return parser.parse_retrain();
    }
    if is_mindsdb && parser.check_keyword(Keyword::Create) {
        return parser.parse_create_predictor();
    }

    Err(parser.error("expected a statement"))
}
