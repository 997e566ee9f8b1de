// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Shared expression-tree helpers used by every planning shape: splitting
//! top-level `AND` conjunctions, and rewriting `Identifier` nodes throughout
//! a tree (integration-prefix stripping, synthetic `result_N` substitution).

use mindsdb_sql_ast::{
    BetweenOperation, BinaryOperation, Expr, Function, Identifier, Tuple, TypeCast, UnaryOperation,
};

/// Splits `a AND b AND c` into `[a, b, c]`. A non-`AND` expression is
/// returned as a single-element list.
pub(crate) fn and_conjuncts(expr: &Expr) -> Vec<Expr> {
    match expr {
        Expr::BinaryOperation(op) if op.op.eq_ignore_ascii_case("and") => {
            let (left, right) = op.args.as_ref();
            let mut out = and_conjuncts(left);
            out.extend(and_conjuncts(right));
            out
        }
        other => vec![other.clone()],
    }
}

/// Applies `f` to every `Identifier` reachable in `expr`, recursing through
/// every composite `Expr` variant. Subqueries are left untouched — nested
/// `SELECT`s inside a WHERE/target are out of scope for prefix rewriting,
/// since they address their own, independently-planned `FROM` clause.
pub(crate) fn rewrite_identifiers(expr: Expr, f: &impl Fn(&Identifier) -> Identifier) -> Expr {
    match expr {
        Expr::Identifier(ident) => Expr::Identifier(f(&ident)),
        Expr::BinaryOperation(op) => {
            let BinaryOperation { op: kind, args, parentheses, alias } = op;
            let (left, right) = *args;
            Expr::BinaryOperation(BinaryOperation {
                op: kind,
                args: Box::new((rewrite_identifiers(left, f), rewrite_identifiers(right, f))),
                parentheses,
                alias,
            })
        }
        Expr::UnaryOperation(op) => {
            let UnaryOperation { op: kind, args, parentheses, alias } = op;
            Expr::UnaryOperation(UnaryOperation {
                op: kind,
                args: Box::new(rewrite_identifiers(*args, f)),
                parentheses,
                alias,
            })
        }
        Expr::BetweenOperation(op) => {
            let BetweenOperation { args, alias } = op;
            let (e, low, high) = *args;
            Expr::BetweenOperation(BetweenOperation {
                args: Box::new((
                    rewrite_identifiers(e, f),
                    rewrite_identifiers(low, f),
                    rewrite_identifiers(high, f),
                )),
                alias,
            })
        }
        Expr::Function(func) => {
            let Function { op, args, distinct, alias } = func;
            Expr::Function(Function {
                op,
                args: args.into_iter().map(|a| rewrite_identifiers(a, f)).collect(),
                distinct,
                alias,
            })
        }
        Expr::Tuple(tup) => {
            let Tuple { items, alias } = tup;
            Expr::Tuple(Tuple { items: items.into_iter().map(|i| rewrite_identifiers(i, f)).collect(), alias })
        }
        Expr::TypeCast(cast) => {
            let TypeCast { type_name, arg, alias } = cast;
            Expr::TypeCast(TypeCast { type_name, arg: Box::new(rewrite_identifiers(*arg, f)), alias })
        }
        other => other,
    }
}

/// Drops a leading `prefix` segment from every multi-part identifier whose
/// first segment equals it, throughout `expr`.
pub(crate) fn strip_prefix(expr: Expr, prefix: &str) -> Expr {
    rewrite_identifiers(expr, &|ident| {
        if ident.parts.len() > 1 && ident.parts[0] == prefix {
            let mut parts = ident.parts.clone();
            parts.remove(0);
            let mut quoted = ident.quoted_parts.clone();
            quoted.remove(0);
            Identifier { parts, quoted_parts: quoted, alias: ident.alias.clone() }
        } else {
            ident.clone()
        }
    })
}

/// Rewrites `old_table.col` references to `new_table.col`, leaving any
/// other leading segment untouched. Used for the `result_N` substitution in
/// `JoinStep.query` and for group-key `$var` substitution.
pub(crate) fn rename_table_prefix(expr: Expr, old_table: &str, new_table: &str) -> Expr {
    rewrite_identifiers(expr, &|ident| {
        if !ident.parts.is_empty() && ident.parts[0] == old_table {
            let mut parts = ident.parts.clone();
            parts[0] = new_table.to_string();
            Identifier { parts, quoted_parts: ident.quoted_parts.clone(), alias: ident.alias.clone() }
        } else {
            ident.clone()
        }
    })
}
