// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! AST value types for the mindsdb SQL front-end: every node is a plain
//! tagged union with deep `PartialEq`, a `to_tree()` structural form used in
//! tests, and a `Display` impl for SQL-text rendering. See `SPEC_FULL.md` §3.

pub mod dialect;
pub mod expr;
pub mod select;
pub mod statement;
pub mod tree;

pub use dialect::Dialect;
pub use expr::{
    BetweenOperation, BinOp, BinaryOperation, Constant, ConstantValue, Expr, Function, Identifier,
    Latest, Parameter, Star, Tuple, TypeCast, UnaryOperation, Variable,
};
pub use select::{FromTable, Join, JoinType, NullsOrder, OrderBy, Select, SortDirection};
pub use statement::{
    AlterTable, CreatePredictor, DropPredictor, Explain, RetrainPredictor, Set, Statement, Use,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_one_renders_and_builds_tree() {
        let select = Select::new(vec![Expr::Constant(Constant::integer(1))]);
        assert_eq!(select.to_string(), "SELECT 1");
        assert!(select.to_tree(0).contains("targets=["));
    }

    #[test]
    fn identifier_dotted_round_trips() {
        let id = Identifier::dotted("tab1.column1");
        assert_eq!(id.to_string(), "tab1.column1");
        assert_eq!(id.parts, vec!["tab1", "column1"]);
    }

    #[test]
    fn identifier_quotes_segment_needing_it() {
        let id = Identifier::new(vec!["tab-1"]);
        assert_eq!(id.to_string(), "`tab-1`");
    }

    #[test]
    fn binary_operation_renders_with_parentheses() {
        let op = BinaryOperation::new(
            "+",
            Expr::Constant(Constant::integer(1)),
            Expr::Constant(Constant::integer(2)),
        )
        .with_parentheses();
        assert_eq!(op.to_string(), "(1 + 2)");
    }

    #[test]
    fn count_distinct_renders() {
        let f = Function::new("COUNT", vec![Expr::Identifier(Identifier::new(vec!["s"]))]).distinct();
        assert_eq!(f.to_string(), "COUNT(DISTINCT s)");
    }

    #[test]
    fn variable_renders_system_vs_session() {
        assert_eq!(Variable::new("version").to_string(), "@version");
        assert_eq!(Variable::system("version").to_string(), "@@version");
    }

    #[test]
    fn set_character_set_results_keeps_binary_operation_encoding() {
        let set = Set::assignment(Expr::BinaryOperation(BinaryOperation::new(
            "=",
            Expr::Identifier(Identifier::new(vec!["character_set_results"])),
            Expr::Constant(Constant::null()),
        )));
        assert_eq!(set.to_string(), "SET character_set_results = NULL");
    }

    #[test]
    fn use_statement_round_trips() {
        let stmt = Statement::Use(Use::new(Identifier::new(vec!["some_db"])));
        assert_eq!(stmt.to_string(), "USE some_db");
    }
}
