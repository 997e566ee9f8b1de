// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Dialect-aware SQL parser. `parse_sql(text, dialect)` tokenizes then
//! parses a single statement, returning the AST types from
//! `mindsdb-sql-ast`. See `SPEC_FULL.md` §4.2 for grammar and §2A.2 for the
//! error-handling design.

pub mod error;
mod expr;
mod parser;
mod select;
mod statements;

pub use error::{ParseResult, ParsingException};
pub use parser::Parser;

use mindsdb_sql_ast::{Dialect, Statement};

/// Tokenizes `text` under `dialect` and parses exactly one statement, an
/// optional trailing `;`, and nothing else.
pub fn parse_sql(text: &str, dialect: Dialect) -> ParseResult<Statement> {
    let tokens = mindsdb_sql_lexer::tokenize(text, dialect)?;
    let mut parser = Parser::new(tokens, dialect);
    tracing::debug!(target: "sql_parser", dialect = ?dialect, "parsing statement");
    let statement = statements::parse_statement(&mut parser)?;
    parser.finish()?;
    Ok(statement)
}

impl Parser {
    /// Consumes an optional trailing `;` and confirms no tokens remain.
    fn finish(&mut self) -> ParseResult<()> {
        self.match_kind(&mindsdb_sql_lexer::TokenKind::Semicolon);
        if self.is_at_end() {
            Ok(())
        } else {
            Err(self.error("unexpected trailing input"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindsdb_sql_ast::Dialect;

    #[test]
    fn parses_simple_select() {
        let stmt = parse_sql("SELECT 1", Dialect::Sqlite).unwrap();
        assert_eq!(stmt.to_string(), "SELECT 1");
    }

    #[test]
    fn parses_select_with_where_and_alias() {
        let stmt = parse_sql("SELECT a AS x FROM t1 WHERE a != 1", Dialect::Sqlite).unwrap();
        assert_eq!(stmt.to_string(), "SELECT a AS x FROM t1 WHERE a != 1");
    }

    #[test]
    fn rejects_where_before_from() {
        let tokens = mindsdb_sql_lexer::tokenize("SELECT 1 WHERE a = 1", Dialect::Sqlite).unwrap();
        let mut parser = Parser::new(tokens, Dialect::Sqlite);
        let err = statements::parse_statement(&mut parser).unwrap_err();
        assert!(err.message.contains("requires"));
    }

    #[test]
    fn rejects_group_by_before_where() {
        let sql = "SELECT a FROM t1 GROUP BY a WHERE a = 1";
        let tokens = mindsdb_sql_lexer::tokenize(sql, Dialect::Sqlite).unwrap();
        let mut parser = Parser::new(tokens, Dialect::Sqlite);
        let err = statements::parse_statement(&mut parser).unwrap_err();
        assert!(err.message.contains("must go after"));
    }

    #[test]
    fn rejects_duplicate_where() {
        let sql = "SELECT a FROM t1 WHERE a = 1 WHERE b = 2";
        let tokens = mindsdb_sql_lexer::tokenize(sql, Dialect::Sqlite).unwrap();
        let mut parser = Parser::new(tokens, Dialect::Sqlite);
        let err = statements::parse_statement(&mut parser).unwrap_err();
        assert!(err.message.contains("duplicate"));
    }

    #[test]
    fn rejects_non_boolean_where() {
        let sql = "SELECT a FROM t1 WHERE a + 1";
        let tokens = mindsdb_sql_lexer::tokenize(sql, Dialect::Sqlite).unwrap();
        let mut parser = Parser::new(tokens, Dialect::Sqlite);
        let err = statements::parse_statement(&mut parser).unwrap_err();
        assert!(err.message.contains("evaluates to a boolean"));
    }

    #[test]
    fn parses_limit_offset_pair() {
        let stmt = parse_sql("SELECT a FROM t1 LIMIT 2, 1", Dialect::Sqlite).unwrap();
        assert_eq!(stmt.to_string(), "SELECT a FROM t1 LIMIT 1 OFFSET 2");
    }

    #[test]
    fn parses_implicit_join() {
        let stmt = parse_sql("SELECT a FROM t1, t2", Dialect::Sqlite).unwrap();
        assert_eq!(stmt.to_string(), "SELECT a FROM t1, t2");
    }

    #[test]
    fn parses_explicit_left_join() {
        let sql = "SELECT a FROM t1 LEFT JOIN t2 ON t1.id = t2.id";
        let stmt = parse_sql(sql, Dialect::Sqlite).unwrap();
        assert_eq!(stmt.to_string(), sql);
    }

    #[test]
    fn parses_subquery_in_from() {
        let sql = "SELECT a FROM (SELECT b FROM t1) AS sub";
        let stmt = parse_sql(sql, Dialect::Sqlite).unwrap();
        assert_eq!(stmt.to_string(), sql);
    }

    #[test]
    fn parses_set_assignment_keeps_binary_operation() {
        let stmt = parse_sql("SET character_set_results = NULL", Dialect::MySql).unwrap();
        assert_eq!(stmt.to_string(), "SET character_set_results = NULL");
    }

    #[test]
    fn parses_set_names() {
        let stmt = parse_sql("SET NAMES utf8", Dialect::MySql).unwrap();
        assert_eq!(stmt.to_string(), "SET NAMES utf8");
    }

    #[test]
    fn parses_set_bare_category() {
        let stmt = parse_sql("SET autocommit", Dialect::MySql).unwrap();
        assert_eq!(stmt.to_string(), "SET autocommit");
    }

    #[test]
    fn parses_use_statement() {
        let stmt = parse_sql("USE mindsdb", Dialect::MindsDb).unwrap();
        assert_eq!(stmt.to_string(), "USE mindsdb");
    }

    #[test]
    fn use_is_rejected_outside_mindsdb_dialect() {
        let err = parse_sql("USE mindsdb", Dialect::MySql).unwrap_err();
        assert!(err.message.contains("expected a statement"));
    }

    #[test]
    fn parses_select_at_variable() {
        let stmt = parse_sql("SELECT @@version", Dialect::MySql).unwrap();
        assert_eq!(stmt.to_string(), "SELECT @@version");
    }

    #[test]
    fn parses_create_predictor() {
        let sql = "CREATE PREDICTOR p1 FROM integ (SELECT a FROM t1) PREDICT a";
        let stmt = parse_sql(sql, Dialect::MindsDb).unwrap();
        assert_eq!(stmt.to_string(), sql);
    }

    #[test]
    fn parses_drop_predictor() {
        let stmt = parse_sql("DROP PREDICTOR p1", Dialect::MindsDb).unwrap();
        assert_eq!(stmt.to_string(), "DROP PREDICTOR p1");
    }

    #[test]
    fn rejects_trailing_garbage() {
        let err = parse_sql("SELECT 1 2", Dialect::Sqlite).unwrap_err();
        assert!(err.message.contains("unexpected trailing input"));
    }
}
