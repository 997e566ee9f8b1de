// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Facade crate: the three entry points `SPEC_FULL.md` §6 promises —
//! `parse_sql`, `get_lexer_parser`, and `plan_query` — plus the `Dialect`
//! and error types every caller needs, re-exported from the crates that
//! actually implement them so a consumer depends on one crate.

pub use mindsdb_sql_ast::Dialect;
pub use mindsdb_sql_ast::Statement;
pub use mindsdb_sql_lexer::{LexError, Token, TokenKind};
pub use mindsdb_sql_parser::{ParseResult, ParsingException};
pub use mindsdb_sql_planner::{
    plan_query, PlanResult, PlannerOptions, PlanningException, PredictorMetadata, QueryPlan, Step,
};

/// Parses a dialect name (`"sqlite"`, `"mysql"`, or `"mindsdb"`, case
/// insensitive) the same way `Dialect::parse` does, but surfaces an
/// unrecognized name as a `ParsingException` rather than `None` — this is
/// the boundary where an unknown dialect string becomes a user-facing
/// error, since `parse_sql`/`get_lexer_parser` are the entry points callers
/// actually hit with a raw string.
fn resolve_dialect(dialect: &str) -> ParseResult<Dialect> {
    Dialect::parse(dialect).ok_or_else(|| ParsingException::new(format!("unknown SQL dialect '{dialect}'")))
}

/// `parse_sql(text, dialect) → ASTNode` (`SPEC_FULL.md` §6).
pub fn parse_sql(text: &str, dialect: &str) -> ParseResult<Statement> {
    mindsdb_sql_parser::parse_sql(text, resolve_dialect(dialect)?)
}

/// The lower-level lexer/parser pair bound to a single dialect, for callers
/// that want to tokenize without parsing or reuse the pair across many
/// calls without re-resolving the dialect string each time.
#[derive(Debug, Clone, Copy)]
pub struct LexerParser {
    dialect: Dialect,
}

impl LexerParser {
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn tokenize(&self, text: &str) -> Result<Vec<Token>, LexError> {
        mindsdb_sql_lexer::tokenize(text, self.dialect)
    }

    pub fn parse(&self, text: &str) -> ParseResult<Statement> {
        mindsdb_sql_parser::parse_sql(text, self.dialect)
    }
}

/// `get_lexer_parser(dialect) → (lexer, parser)` (`SPEC_FULL.md` §6). Both
/// halves of the pair are plain functions of a `Dialect`, so rather than a
/// tuple of two trait objects this returns one value exposing both.
pub fn get_lexer_parser(dialect: &str) -> ParseResult<LexerParser> {
    Ok(LexerParser { dialect: resolve_dialect(dialect)? })
}

/// The two error kinds `SPEC_FULL.md` §7 names, unified for callers that
/// want to `?` across both a parse and a plan in one function without
/// matching on which stage failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SqlError {
    #[error(transparent)]
    Parsing(#[from] ParsingException),
    #[error(transparent)]
    Planning(#[from] PlanningException),
}

pub type SqlResult<T> = Result<T, SqlError>;

/// Convenience composition of `parse_sql` and `plan_query` for the common
/// caller that has a raw SQL string and wants a plan or a single error.
pub fn parse_and_plan(text: &str, dialect: &str, opts: &PlannerOptions) -> SqlResult<QueryPlan> {
    let statement = parse_sql(text, dialect)?;
    Ok(plan_query(&statement, opts)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sql_rejects_unknown_dialect() {
        let err = parse_sql("SELECT 1", "oracle").unwrap_err();
        assert!(err.message.contains("unknown SQL dialect"));
    }

    #[test]
    fn parse_sql_round_trips_through_display() {
        let stmt = parse_sql("SELECT a AS x FROM t1 WHERE a != 1", "sqlite").unwrap();
        let rendered = stmt.to_string();
        let reparsed = parse_sql(&rendered, "sqlite").unwrap();
        assert_eq!(stmt, reparsed);
    }

    #[test]
    fn get_lexer_parser_tokenizes_and_parses_under_the_same_dialect() {
        let pair = get_lexer_parser("mysql").unwrap();
        let tokens = pair.tokenize("SELECT @@version").unwrap();
        assert!(!tokens.is_empty());
        let stmt = pair.parse("SELECT @@version").unwrap();
        assert_eq!(stmt.to_string(), "SELECT @@version");
    }

    #[test]
    fn end_to_end_parse_then_plan_table_predictor_join() {
        let stmt = parse_sql(
            "SELECT tab1.c, pred.p FROM int.tab1 JOIN mindsdb.pred",
            "mindsdb",
        )
        .unwrap();
        let opts = PlannerOptions::new(vec!["int".to_string()]);
        let plan = plan_query(&stmt, &opts).unwrap();
        assert_eq!(plan.steps.len(), 4);
        assert!(matches!(plan.steps[0], Step::FetchDataframe(_)));
        assert!(matches!(plan.steps.last().unwrap(), Step::Project(_)));
    }

    #[test]
    fn end_to_end_non_select_statement_plans_to_empty_steps() {
        let stmt = parse_sql("START TRANSACTION", "mindsdb").unwrap();
        let opts = PlannerOptions::default();
        let plan = plan_query(&stmt, &opts).unwrap();
        assert!(plan.steps.is_empty());
    }
}
