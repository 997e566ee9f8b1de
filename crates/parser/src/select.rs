// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! `SELECT` clause parsing: target list, `FROM` (including joins and
//! subqueries), `WHERE`/`GROUP BY`/`HAVING`/`ORDER BY`/`LIMIT`/`OFFSET`, with
//! the clause-ordering and uniqueness enforcement from `SPEC_FULL.md` §4.2.

use mindsdb_sql_ast::{Constant, Expr, FromTable, Join, JoinType, NullsOrder, OrderBy, Select, SortDirection, Star};
use mindsdb_sql_lexer::{Keyword, TokenKind};

use crate::error::{ParseResult, ParsingException};
use crate::expr::attach_alias;
use crate::parser::Parser;

impl Parser {
    pub(crate) fn parse_select_body(&mut self) -> ParseResult<Select> {
        self.expect_keyword(Keyword::Select)?;
        let distinct = self.match_keyword(Keyword::Distinct);
        let targets = self.parse_target_list()?;
        let mut select = Select::new(targets);
        select.distinct = distinct;

        const FROM: u8 = 0;
        const WHERE: u8 = 1;
        const GROUP_BY: u8 = 2;
        const HAVING: u8 = 3;
        const ORDER_BY: u8 = 4;
        const LIMIT: u8 = 5;
        const OFFSET: u8 = 6;

        let mut last_rank: i16 = -1;
        let mut seen = [false; 7];
        let mut limit_gave_offset = false;

        loop {
            let (rank, name) = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Keyword(Keyword::From)) => (FROM, "FROM"),
                Some(TokenKind::Keyword(Keyword::Where)) => (WHERE, "WHERE"),
                Some(TokenKind::Keyword(Keyword::Group)) => (GROUP_BY, "GROUP BY"),
                Some(TokenKind::Keyword(Keyword::Having)) => (HAVING, "HAVING"),
                Some(TokenKind::Keyword(Keyword::Order)) => (ORDER_BY, "ORDER BY"),
                Some(TokenKind::Keyword(Keyword::Limit)) => (LIMIT, "LIMIT"),
                Some(TokenKind::Keyword(Keyword::Offset)) => (OFFSET, "OFFSET"),
                _ => break,
            };

            if seen[rank as usize] {
                return Err(self.error(format!("duplicate {name} clause")));
            }
            if (rank as i16) < last_rank {
                return Err(self.error(format!("{name} must go after the preceding clauses")));
            }
            seen[rank as usize] = true;
            last_rank = rank as i16;

            match rank {
                FROM => {
                    self.expect_keyword(Keyword::From)?;
                    select.from_table = Some(Box::new(self.parse_from_clause()?));
                }
                WHERE => {
                    self.expect_keyword(Keyword::Where)?;
                    if select.from_table.is_none() {
                        return Err(self.error("WHERE requires FROM"));
                    }
                    let expr = self.parse_expr()?;
                    if self.check_keyword(Keyword::As) {
                        return Err(self.error("WHERE must not carry an alias"));
                    }
                    if !expr.is_boolean_valued() {
                        return Err(self.error(
                            "WHERE must contain an operation that evaluates to a boolean",
                        ));
                    }
                    select.where_clause = Some(expr);
                }
                GROUP_BY => {
                    self.expect_keyword(Keyword::Group)?;
                    self.expect_keyword(Keyword::By)?;
                    select.group_by = Some(self.parse_expr_list()?);
                }
                HAVING => {
                    self.expect_keyword(Keyword::Having)?;
                    select.having = Some(self.parse_expr()?);
                }
                ORDER_BY => {
                    self.expect_keyword(Keyword::Order)?;
                    self.expect_keyword(Keyword::By)?;
                    select.order_by = Some(self.parse_order_by_list()?);
                }
                LIMIT => {
                    self.expect_keyword(Keyword::Limit)?;
                    let first = self.parse_integer_literal("LIMIT")?;
                    if self.match_kind(&TokenKind::Comma) {
                        let second = self.parse_integer_literal("LIMIT")?;
                        select.offset = Some(first);
                        select.limit = Some(second);
                        limit_gave_offset = true;
                    } else {
                        select.limit = Some(first);
                    }
                }
                OFFSET => {
                    self.expect_keyword(Keyword::Offset)?;
                    if limit_gave_offset {
                        return Err(self.error(
                            "cannot combine `LIMIT a, b` with an explicit OFFSET clause",
                        ));
                    }
                    select.offset = Some(self.parse_integer_literal("OFFSET")?);
                }
                _ => unreachable!("clause rank out of range"),
            }
        }

        Ok(select)
    }

    fn parse_target_list(&mut self) -> ParseResult<Vec<Expr>> {
        let mut targets = vec![self.parse_target()?];
        while self.match_kind(&TokenKind::Comma) {
            targets.push(self.parse_target()?);
        }
        Ok(targets)
    }

    fn parse_target(&mut self) -> ParseResult<Expr> {
        if self.check_op("*") {
            self.advance();
            return Ok(Expr::Star(Star));
        }
        let expr = self.parse_expr()?;
        match self.maybe_parse_alias()? {
            Some(alias) => Ok(attach_alias(expr, alias)),
            None => Ok(expr),
        }
    }

    fn parse_expr_list(&mut self) -> ParseResult<Vec<Expr>> {
        let mut items = vec![self.parse_expr()?];
        while self.match_kind(&TokenKind::Comma) {
            items.push(self.parse_expr()?);
        }
        Ok(items)
    }

    fn parse_order_by_list(&mut self) -> ParseResult<Vec<OrderBy>> {
        let mut items = vec![self.parse_order_by_item()?];
        while self.match_kind(&TokenKind::Comma) {
            items.push(self.parse_order_by_item()?);
        }
        Ok(items)
    }

    fn parse_order_by_item(&mut self) -> ParseResult<OrderBy> {
        let field = self.parse_expr()?;
        let direction = if self.match_keyword(Keyword::Asc) {
            SortDirection::Asc
        } else if self.match_keyword(Keyword::Desc) {
            SortDirection::Desc
        } else {
            SortDirection::Default
        };
        let nulls = if self.match_keyword(Keyword::Nulls) {
            if self.match_keyword(Keyword::First) {
                NullsOrder::First
            } else {
                self.expect_keyword(Keyword::Last)?;
                NullsOrder::Last
            }
        } else {
            NullsOrder::Default
        };
        Ok(OrderBy { field, direction, nulls })
    }

    fn parse_integer_literal(&mut self, clause: &str) -> ParseResult<Expr> {
        match self.peek().cloned() {
            Some(tok) => match tok.kind {
                TokenKind::IntegerLiteral(v) => {
                    self.advance();
                    Ok(Expr::Constant(Constant::integer(v)))
                }
                _ => Err(ParsingException::new(format!(
                    "{clause} operand must be an integer constant, found '{}'",
                    tok.text
                ))),
            },
            None => Err(ParsingException::new(format!(
                "{clause} operand must be an integer constant, found end of input"
            ))),
        }
    }

    fn parse_from_clause(&mut self) -> ParseResult<FromTable> {
        let mut left = self.parse_from_primary()?;
        loop {
            if self.check_kind(&TokenKind::Comma) {
                self.advance();
                let right = self.parse_from_primary()?;
                left = FromTable::Join(Box::new(Join::implicit(left, right)));
                continue;
            }
            if let Some(join_type) = self.match_join_keyword() {
                let right = self.parse_from_primary()?;
                let condition = if self.match_keyword(Keyword::On) {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                left = FromTable::Join(Box::new(Join::explicit(left, right, join_type, condition)));
                continue;
            }
            break;
        }
        Ok(left)
    }

    fn match_join_keyword(&mut self) -> Option<JoinType> {
        if self.match_keyword(Keyword::Join) {
            return Some(JoinType::Inner);
        }
        if self.match_keyword(Keyword::Inner) {
            let _ = self.match_keyword(Keyword::Join);
            return Some(JoinType::Inner);
        }
        if self.match_keyword(Keyword::Left) {
            let _ = self.match_keyword(Keyword::Join);
            return Some(JoinType::Left);
        }
        if self.match_keyword(Keyword::Right) {
            let _ = self.match_keyword(Keyword::Join);
            return Some(JoinType::Right);
        }
        if self.match_keyword(Keyword::Full) {
            let _ = self.match_keyword(Keyword::Join);
            return Some(JoinType::Full);
        }
        None
    }

    fn parse_from_primary(&mut self) -> ParseResult<FromTable> {
        if self.check_kind(&TokenKind::LParen) {
            self.advance();
            let select = self.parse_select_body()?.with_parentheses();
            self.expect_kind(TokenKind::RParen, "')' closing subquery")?;
            let select = match self.maybe_parse_alias()? {
                Some(alias) => select.with_alias(alias),
                None => select,
            };
            return Ok(FromTable::Subquery(Box::new(select)));
        }
        let ident = self.parse_identifier()?;
        let ident = match self.maybe_parse_alias()? {
            Some(alias) => ident.with_alias(alias),
            None => ident,
        };
        Ok(FromTable::Identifier(ident))
    }

    /// `AS name`, or a bare juxtaposed identifier (`expr name`). Clause
    /// keywords (`FROM`, `WHERE`, ...) are never identifiers, so this never
    /// swallows the next clause.
    pub(crate) fn maybe_parse_alias(&mut self) -> ParseResult<Option<String>> {
        if self.match_keyword(Keyword::As) {
            let (name, _) = self.parse_identifier_segment()?;
            return Ok(Some(name));
        }
        if matches!(
            self.peek().map(|t| &t.kind),
            Some(TokenKind::Identifier(_)) | Some(TokenKind::QuotedIdentifier(_))
        ) {
            let (name, _) = self.parse_identifier_segment()?;
            return Ok(Some(name));
        }
        Ok(None)
    }
}
