// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Expression grammar, in precedence order from loosest to tightest:
//! `OR` < `AND` < prefix `NOT` < comparison (`=`, `<`, `LIKE`, `IN`, `IS`,
//! `BETWEEN`, ...) < additive (`+`, `-`) < multiplicative (`*`, `/`, `%`) <
//! unary minus < primary.

use mindsdb_sql_ast::{
    BetweenOperation, BinaryOperation, Constant, Expr, Function, Identifier, Latest, Parameter,
    Star, Tuple, TypeCast, UnaryOperation, Variable,
};
use mindsdb_sql_lexer::{Keyword, TokenKind};

use crate::error::{ParseResult, ParsingException};
use crate::parser::Parser;

impl Parser {
    pub fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_and()?;
        while self.match_keyword(Keyword::Or) {
            let right = self.parse_and()?;
            left = Expr::BinaryOperation(BinaryOperation::new("or", left, right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_not()?;
        while self.match_keyword(Keyword::And) {
            let right = self.parse_not()?;
            left = Expr::BinaryOperation(BinaryOperation::new("and", left, right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> ParseResult<Expr> {
        if self.match_keyword(Keyword::Not) {
            let inner = self.parse_not()?;
            return Ok(Expr::UnaryOperation(UnaryOperation::new("NOT", inner)));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let left = self.parse_additive()?;

        if self.match_keyword(Keyword::Between) {
            let low = self.parse_additive()?;
            self.expect_keyword(Keyword::And)?;
            let high = self.parse_additive()?;
            return Ok(Expr::BetweenOperation(BetweenOperation::new(left, low, high)));
        }

        let negated = self.match_keyword(Keyword::Not);

        if self.match_keyword(Keyword::Like) {
            let right = self.parse_additive()?;
            let op = if negated { "not like" } else { "like" };
            return Ok(Expr::BinaryOperation(BinaryOperation::new(op, left, right)));
        }
        if self.match_keyword(Keyword::Ilike) {
            let right = self.parse_additive()?;
            let op = if negated { "not ilike" } else { "ilike" };
            return Ok(Expr::BinaryOperation(BinaryOperation::new(op, left, right)));
        }
        if self.match_keyword(Keyword::In) {
            let right = self.parse_in_rhs()?;
            let op = if negated { "not in" } else { "in" };
            return Ok(Expr::BinaryOperation(BinaryOperation::new(op, left, right)));
        }
        if negated {
            return Err(self.error("expected LIKE, ILIKE, or IN after NOT"));
        }

        if self.match_keyword(Keyword::Is) {
            let negated = self.match_keyword(Keyword::Not);
            self.expect_keyword(Keyword::Null)?;
            let op = if negated { "is not" } else { "is" };
            return Ok(Expr::BinaryOperation(BinaryOperation::new(
                op,
                left,
                Expr::Constant(Constant::null()),
            )));
        }

        for op in ["!=", "<>", "<=", ">=", "<", ">", "="] {
            if self.check_op(op) {
                self.advance();
                let right = self.parse_additive()?;
                return Ok(Expr::BinaryOperation(BinaryOperation::new(op, left, right)));
            }
        }

        Ok(left)
    }

    /// The right-hand side of `IN`: either `(subquery)` or `(expr, expr, ...)`.
    fn parse_in_rhs(&mut self) -> ParseResult<Expr> {
        self.expect_kind(TokenKind::LParen, "'(' after IN")?;
        if self.check_keyword(Keyword::Select) {
            let select = self.parse_select_body()?.with_parentheses();
            self.expect_kind(TokenKind::RParen, "')' closing subquery")?;
            return Ok(Expr::Subquery(Box::new(select)));
        }
        let mut items = vec![self.parse_expr()?];
        while self.match_kind(&TokenKind::Comma) {
            items.push(self.parse_expr()?);
        }
        self.expect_kind(TokenKind::RParen, "')' closing IN list")?;
        Ok(Expr::Tuple(Tuple::new(items)))
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            if self.check_op("+") {
                self.advance();
                let right = self.parse_multiplicative()?;
                left = Expr::BinaryOperation(BinaryOperation::new("+", left, right));
            } else if self.check_op("-") {
                self.advance();
                let right = self.parse_multiplicative()?;
                left = Expr::BinaryOperation(BinaryOperation::new("-", left, right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            if self.check_op("*") {
                self.advance();
                let right = self.parse_unary()?;
                left = Expr::BinaryOperation(BinaryOperation::new("*", left, right));
            } else if self.check_op("/") {
                self.advance();
                let right = self.parse_unary()?;
                left = Expr::BinaryOperation(BinaryOperation::new("/", left, right));
            } else if self.check_op("%") {
                self.advance();
                let right = self.parse_unary()?;
                left = Expr::BinaryOperation(BinaryOperation::new("%", left, right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if self.match_op("-") {
            let inner = self.parse_unary()?;
            return Ok(Expr::UnaryOperation(UnaryOperation::new("-", inner)));
        }
        if self.match_op("+") {
            return self.parse_unary();
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let Some(tok) = self.peek().cloned() else {
            return Err(self.error("unexpected end of input"));
        };

        match &tok.kind {
            TokenKind::IntegerLiteral(v) => {
                self.advance();
                Ok(Expr::Constant(Constant::integer(*v)))
            }
            TokenKind::FloatLiteral(v) => {
                self.advance();
                Ok(Expr::Constant(Constant::float(*v)))
            }
            TokenKind::StringLiteral(s) => {
                self.advance();
                Ok(Expr::Constant(Constant::string(s.clone())))
            }
            TokenKind::Parameter => {
                self.advance();
                Ok(Expr::Parameter(Parameter::new("?")))
            }
            TokenKind::Variable { name, is_system_var } => {
                let (name, is_system_var) = (name.clone(), *is_system_var);
                self.advance();
                let var = if is_system_var { Variable::system(name) } else { Variable::new(name) };
                Ok(Expr::Variable(var))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Ok(Expr::Constant(Constant::null()))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(Expr::Constant(Constant::boolean(true)))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(Expr::Constant(Constant::boolean(false)))
            }
            TokenKind::Keyword(Keyword::Cast) => self.parse_cast(),
            TokenKind::Keyword(Keyword::Latest) => {
                self.advance();
                if self.match_kind(&TokenKind::LParen) {
                    self.expect_kind(TokenKind::RParen, "')' after LATEST(")?;
                }
                Ok(Expr::Latest(Latest))
            }
            TokenKind::LParen => self.parse_parenthesized(),
            TokenKind::Identifier(_) | TokenKind::QuotedIdentifier(_) => self.parse_identifier_or_call(),
            _ => Err(self.error("expected an expression")),
        }
    }

    fn parse_cast(&mut self) -> ParseResult<Expr> {
        self.expect_keyword(Keyword::Cast)?;
        self.expect_kind(TokenKind::LParen, "'(' after CAST")?;
        let arg = self.parse_expr()?;
        self.expect_keyword(Keyword::As)?;
        let type_name = self.parse_type_name()?;
        self.expect_kind(TokenKind::RParen, "')' closing CAST")?;
        Ok(Expr::TypeCast(TypeCast::new(type_name, arg)))
    }

    fn parse_type_name(&mut self) -> ParseResult<String> {
        let mut name = match self.advance() {
            Some(tok) => match tok.kind {
                TokenKind::Identifier(s) => s,
                TokenKind::Keyword(kw) => kw.as_str().to_string(),
                _ => return Err(self.error("expected a type name")),
            },
            None => return Err(self.error("expected a type name")),
        };
        if self.match_kind(&TokenKind::LParen) {
            name.push('(');
            if let Some(tok) = self.peek().cloned() {
                if let TokenKind::IntegerLiteral(n) = tok.kind {
                    self.advance();
                    name.push_str(&n.to_string());
                }
            }
            self.expect_kind(TokenKind::RParen, "')' closing type size")?;
            name.push(')');
        }
        Ok(name)
    }

    fn parse_parenthesized(&mut self) -> ParseResult<Expr> {
        self.expect_kind(TokenKind::LParen, "'('")?;
        if self.check_keyword(Keyword::Select) {
            let select = self.parse_select_body()?.with_parentheses();
            self.expect_kind(TokenKind::RParen, "')' closing subquery")?;
            return Ok(Expr::Subquery(Box::new(select)));
        }
        let first = self.parse_expr()?;
        if self.check_kind(&TokenKind::Comma) {
            let mut items = vec![first];
            while self.match_kind(&TokenKind::Comma) {
                items.push(self.parse_expr()?);
            }
            self.expect_kind(TokenKind::RParen, "')' closing tuple")?;
            return Ok(Expr::Tuple(Tuple::new(items)));
        }
        self.expect_kind(TokenKind::RParen, "')'")?;
        Ok(force_parentheses(first))
    }

    /// Parses a (possibly dotted) identifier, then decides between a bare
    /// identifier and a function call (`name(args)`, with `COUNT(DISTINCT x)`
    /// folded per `SPEC_FULL.md` §4.2).
    fn parse_identifier_or_call(&mut self) -> ParseResult<Expr> {
        let ident = self.parse_identifier()?;
        if ident.parts.len() == 1 && self.check_kind(&TokenKind::LParen) {
            self.advance();
            let distinct = self.match_keyword(Keyword::Distinct);
            let mut args = Vec::new();
            if self.check_op("*") {
                self.advance();
                args.push(Expr::Star(Star));
            } else if !self.check_kind(&TokenKind::RParen) {
                args.push(self.parse_expr()?);
                while self.match_kind(&TokenKind::Comma) {
                    args.push(self.parse_expr()?);
                }
            }
            self.expect_kind(TokenKind::RParen, "')' closing function call")?;
            let mut func = Function::new(ident.parts[0].clone(), args);
            if distinct {
                func = func.distinct();
            }
            return Ok(Expr::Function(func));
        }
        Ok(Expr::Identifier(ident))
    }

    pub(crate) fn parse_identifier(&mut self) -> ParseResult<Identifier> {
        let (first, quoted) = self.parse_identifier_segment()?;
        let mut parts = vec![first];
        let mut quoted_parts = vec![quoted];
        while self.check_kind(&TokenKind::Dot) {
            self.advance();
            let (part, quoted) = self.parse_identifier_segment()?;
            parts.push(part);
            quoted_parts.push(quoted);
        }
        Ok(Identifier::new(parts).with_quoted(quoted_parts))
    }

    pub(crate) fn parse_identifier_segment(&mut self) -> ParseResult<(String, bool)> {
        match self.advance() {
            Some(tok) => match tok.kind {
                TokenKind::Identifier(s) => Ok((s, false)),
                TokenKind::QuotedIdentifier(s) => Ok((s, true)),
                TokenKind::Keyword(kw) => Ok((kw.as_str().to_lowercase(), false)),
                _ => Err(ParsingException::new(format!("expected an identifier, found '{}'", tok.text))),
            },
            None => Err(ParsingException::new("expected an identifier, found end of input")),
        }
    }
}

fn force_parentheses(expr: Expr) -> Expr {
    match expr {
        Expr::BinaryOperation(mut op) => {
            op.parentheses = true;
            Expr::BinaryOperation(op)
        }
        Expr::UnaryOperation(mut op) => {
            op.parentheses = true;
            Expr::UnaryOperation(op)
        }
        other => other,
    }
}

/// Attach a parsed alias to whichever `Expr` variant it followed.
pub(crate) fn attach_alias(expr: Expr, alias: String) -> Expr {
    match expr {
        Expr::Identifier(mut n) => {
            n.alias = Some(alias);
            Expr::Identifier(n)
        }
        Expr::Constant(mut n) => {
            n.alias = Some(alias);
            Expr::Constant(n)
        }
        Expr::Parameter(mut n) => {
            n.alias = Some(alias);
            Expr::Parameter(n)
        }
        Expr::Variable(mut n) => {
            n.alias = Some(alias);
            Expr::Variable(n)
        }
        Expr::Tuple(mut n) => {
            n.alias = Some(alias);
            Expr::Tuple(n)
        }
        Expr::TypeCast(mut n) => {
            n.alias = Some(alias);
            Expr::TypeCast(n)
        }
        Expr::BinaryOperation(mut n) => {
            n.alias = Some(alias);
            Expr::BinaryOperation(n)
        }
        Expr::UnaryOperation(mut n) => {
            n.alias = Some(alias);
            Expr::UnaryOperation(n)
        }
        Expr::BetweenOperation(mut n) => {
            n.alias = Some(alias);
            Expr::BetweenOperation(n)
        }
        Expr::Function(mut n) => {
            n.alias = Some(alias);
            Expr::Function(n)
        }
        Expr::Subquery(mut n) => {
            n.alias = Some(alias);
            Expr::Subquery(n)
        }
        other => other,
    }
}
