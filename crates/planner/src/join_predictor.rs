// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration × predictor join planning, non-time-series
//! (`SPEC_FULL.md` §4.5).

use mindsdb_sql_ast::{Expr, FromTable, Identifier, Join, Select, Star};

use crate::error::{PlanningException, PlanResult};
use crate::plan::{PlanBuilder, QueryPlan};
use crate::rewrite::rename_table_prefix;
use crate::shape::reference_name;
use crate::step::{
    ApplyPredictorStep, FetchDataframeStep, FilterStep, GroupByStep, JoinStep, LimitOffsetStep,
    OrderByStep, ProjectStep, Step,
};

pub(crate) fn plan(
    select: &Select,
    join: &Join,
    integration: String,
    integration_table: Identifier,
    predictor_namespace: String,
    predictor: Identifier,
) -> PlanResult<QueryPlan> {
    let integration_ref = reference_name(&integration_table);
    let predictor_ref = reference_name(&predictor);

    if let Some(where_expr) = &select.where_clause {
        reject_predictor_side_conjuncts(where_expr, &predictor_ref)?;
    }

    let mut builder = PlanBuilder::new();

    let mut fetch_query = Select::new(vec![Expr::Star(Star)]);
    fetch_query.from_table = Some(Box::new(FromTable::Identifier(integration_table)));
    fetch_query.where_clause = select.where_clause.clone();
    let fetch = builder.push(Step::FetchDataframe(FetchDataframeStep { integration: integration.clone(), query: fetch_query }));

    let applied = builder.push(Step::ApplyPredictor(ApplyPredictorStep {
        namespace: predictor_namespace.clone(),
        predictor: predictor.clone(),
        dataframe: fetch,
    }));

    let condition = join.condition.clone().map(|c| {
        let c = rename_table_prefix(c, &integration_ref, "result_0");
        rename_table_prefix(c, &predictor_ref, "result_1")
    });
    let synthetic_join = Join {
        left: FromTable::Identifier(Identifier::new(vec!["result_0"]).with_alias(integration_ref)),
        right: FromTable::Identifier(Identifier::new(vec!["result_1"]).with_alias(predictor_ref)),
        join_type: join.join_type,
        condition,
        implicit: join.implicit,
    };
    let mut last = builder.push(Step::Join(JoinStep { left: fetch, right: applied, query: synthetic_join }));

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

    builder.push(Step::Project(ProjectStep { dataframe: last, columns: select.targets.clone() }));

    Ok(builder.finish(Some(predictor_namespace), vec![integration]))
}

fn reject_predictor_side_conjuncts(expr: &Expr, predictor_ref: &str) -> PlanResult<()> {
    match expr {
        Expr::Identifier(ident) => {
            if ident.parts.first().map(|p| p == predictor_ref).unwrap_or(false) {
                return Err(PlanningException::new(format!(
                    "WHERE cannot filter on predictor-output column '{ident}' before prediction"
                )));
            }
            Ok(())
        }
        Expr::BinaryOperation(op) => {
            let (l, r) = op.args.as_ref();
            reject_predictor_side_conjuncts(l, predictor_ref)?;
            reject_predictor_side_conjuncts(r, predictor_ref)
        }
        Expr::UnaryOperation(op) => reject_predictor_side_conjuncts(&op.args, predictor_ref),
        Expr::BetweenOperation(op) => {
            let (e, low, high) = op.args.as_ref();
            reject_predictor_side_conjuncts(e, predictor_ref)?;
            reject_predictor_side_conjuncts(low, predictor_ref)?;
            reject_predictor_side_conjuncts(high, predictor_ref)
        }
        Expr::Function(f) => {
            for arg in &f.args {
                reject_predictor_side_conjuncts(arg, predictor_ref)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
