// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration × integration join planning (`SPEC_FULL.md` §4.4).

use mindsdb_sql_ast::{Expr, Identifier, Join, Select, Star};

use crate::error::{PlanningException, PlanResult};
use crate::plan::{PlanBuilder, QueryPlan};
use crate::rewrite::strip_prefix;
use crate::shape::reference_name;
use crate::step::{FetchDataframeStep, FilterStep, GroupByStep, JoinStep, LimitOffsetStep, OrderByStep, ProjectStep, Step};

pub(crate) fn plan(
    select: &Select,
    join: &Join,
    left_integration: String,
    left_table: Identifier,
    right_integration: String,
    right_table: Identifier,
) -> PlanResult<QueryPlan> {
    validate_condition(join, &left_table, &right_table)?;

    let mut builder = PlanBuilder::new();
    let mut integrations = vec![left_integration.clone()];
    if right_integration != left_integration {
        integrations.push(right_integration.clone());
    }

    let left_fetch = bare_fetch_step(&left_integration, left_table.clone());
    let left_result = builder.push(Step::FetchDataframe(left_fetch));
    let right_fetch = bare_fetch_step(&right_integration, right_table.clone());
    let right_result = builder.push(Step::FetchDataframe(right_fetch));

    let condition = join.condition.clone().map(|c| strip_join_integration_prefixes(c, &left_integration, &right_integration));
    let rewritten_join = Join {
        left: mindsdb_sql_ast::FromTable::Identifier(left_table.clone()),
        right: mindsdb_sql_ast::FromTable::Identifier(right_table.clone()),
        join_type: join.join_type,
        condition,
        implicit: join.implicit,
    };
    let mut last = builder.push(Step::Join(JoinStep { left: left_result, right: right_result, query: rewritten_join }));

    if let Some(where_expr) = &select.where_clause {
        last = builder.push(Step::Filter(FilterStep { dataframe: last, query: where_expr.clone() }));
    }

    let has_group_by = select.group_by.is_some();
    if let Some(group_by) = &select.group_by {
        last = builder.push(Step::GroupBy(GroupByStep {
            dataframe: last,
            targets: select.targets.clone(),
            columns: group_by.clone(),
        }));
    }
    if let Some(having) = &select.having {
        last = builder.push(Step::Filter(FilterStep { dataframe: last, query: having.clone() }));
    }
    if let Some(order_by) = &select.order_by {
        last = builder.push(Step::OrderBy(OrderByStep { dataframe: last, order_by: order_by.clone() }));
    }
    if select.limit.is_some() || select.offset.is_some() {
        last = builder.push(Step::LimitOffset(LimitOffsetStep {
            dataframe: last,
            limit: select.limit.clone(),
            offset: select.offset.clone(),
        }));
    }

    let columns = if has_group_by { rewrite_group_by_projection(&select.targets) } else { select.targets.clone() };
    builder.push(Step::Project(ProjectStep { dataframe: last, columns }));

    Ok(builder.finish(None, integrations))
}

fn bare_fetch_step(integration: &str, table: Identifier) -> FetchDataframeStep {
    let mut select = Select::new(vec![Expr::Star(Star)]);
    select.from_table = Some(Box::new(mindsdb_sql_ast::FromTable::Identifier(table)));
    FetchDataframeStep { integration: integration.to_string(), query: select }
}

fn strip_join_integration_prefixes(expr: Expr, left_integration: &str, right_integration: &str) -> Expr {
    let expr = strip_prefix(expr, left_integration);
    strip_prefix(expr, right_integration)
}

fn validate_condition(join: &Join, left_table: &Identifier, right_table: &Identifier) -> PlanResult<()> {
    let Some(condition) = &join.condition else { return Ok(()) };
    let left_ref = reference_name(left_table);
    let right_ref = reference_name(right_table);
    walk_condition_identifiers(condition, &left_ref, &right_ref)
}

fn walk_condition_identifiers(expr: &Expr, left_ref: &str, right_ref: &str) -> PlanResult<()> {
    match expr {
        Expr::Identifier(ident) => {
            if ident.parts.len() < 2 {
                return Err(PlanningException::new(format!(
                    "join condition identifier '{ident}' is missing a table qualifier"
                )));
            }
            let table = &ident.parts[0];
            if table != left_ref && table != right_ref {
                return Err(PlanningException::new(format!(
                    "join condition identifier '{ident}' references a table not in the join"
                )));
            }
            Ok(())
        }
        Expr::BinaryOperation(op) => {
            let (l, r) = op.args.as_ref();
            walk_condition_identifiers(l, left_ref, right_ref)?;
            walk_condition_identifiers(r, left_ref, right_ref)
        }
        Expr::UnaryOperation(op) => walk_condition_identifiers(&op.args, left_ref, right_ref),
        Expr::BetweenOperation(op) => {
            let (e, low, high) = op.args.as_ref();
            walk_condition_identifiers(e, left_ref, right_ref)?;
            walk_condition_identifiers(low, left_ref, right_ref)?;
            walk_condition_identifiers(high, left_ref, right_ref)
        }
        Expr::Function(f) => {
            for arg in &f.args {
                walk_condition_identifiers(arg, left_ref, right_ref)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// `sum(tab2.column2) AS total` → `Identifier('sum(tab2.column2)', alias='total')`.
fn rewrite_group_by_projection(targets: &[Expr]) -> Vec<Expr> {
    targets
        .iter()
        .map(|target| match target {
            Expr::Function(f) => {
                let mut bare = f.clone();
                let alias = bare.alias.take();
                let text = Expr::Function(bare).to_string();
                let mut ident = Identifier::new(vec![text]);
                if let Some(alias) = alias {
                    ident = ident.with_alias(alias);
                }
                Expr::Identifier(ident)
            }
            other => other.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindsdb_sql_ast::{Dialect, FromTable};
    use mindsdb_sql_parser::parse_sql;

    fn plan_select(sql: &str) -> QueryPlan {
        let stmt = parse_sql(sql, Dialect::MindsDb).unwrap();
        let select = stmt.as_select().unwrap().clone();
        let FromTable::Join(join) = select.from_table.clone().unwrap().as_ref().clone() else {
            panic!("expected join")
        };
        plan(
            &select,
            &join,
            "int".to_string(),
            Identifier::new(vec!["tab1"]),
            "int".to_string(),
            Identifier::new(vec!["tab2"]),
        )
        .unwrap()
    }

    #[test]
    fn join_step_query_uses_stripped_table_identifiers() {
        let plan = plan_select(
            "SELECT tab1.c FROM int.tab1 JOIN int.tab2 ON tab1.column1 = tab2.column1",
        );
        let Step::Join(join_step) = &plan.steps[2] else { panic!("expected JoinStep") };
        assert_eq!(join_step.query.left, FromTable::Identifier(Identifier::new(vec!["tab1"])));
        assert_eq!(join_step.query.right, FromTable::Identifier(Identifier::new(vec!["tab2"])));
    }
}
