// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! The two single-side `FROM` shapes from `SPEC_FULL.md` §4.3: a lone
//! integration table (case 1) and a predictor-only select (case 5).

use mindsdb_sql_ast::{Expr, FromTable, Identifier, Select};

use crate::error::{PlanningException, PlanResult};
use crate::plan::{PlanBuilder, QueryPlan};
use crate::rewrite::{and_conjuncts, strip_prefix};
use crate::shape::Side;
use crate::step::{ApplyPredictorRowStep, FetchDataframeStep, ProjectStep, Step};
use crate::PlannerOptions;

pub(crate) fn plan_single_integration(
    select: &Select,
    integration: String,
    table: Identifier,
) -> PlanResult<QueryPlan> {
    let mut builder = PlanBuilder::new();

    let mut query = select.clone();
    query.from_table = Some(Box::new(FromTable::Identifier(table)));
    strip_integration_prefix_in_place(&mut query, &integration);

    let fetch = builder.push(Step::FetchDataframe(FetchDataframeStep { integration: integration.clone(), query }));
    builder.push(Step::Project(ProjectStep { dataframe: fetch, columns: select.targets.clone() }));

    Ok(builder.finish(None, vec![integration]))
}

pub(crate) fn plan_predictor_only(select: &Select, namespace: String, predictor: Identifier) -> PlanResult<QueryPlan> {
    let mut builder = PlanBuilder::new();

    let row_dict = match &select.where_clause {
        Some(where_expr) => and_conjuncts(where_expr)
            .into_iter()
            .map(|conjunct| equality_conjunct_to_pair(&conjunct))
            .collect::<PlanResult<Vec<_>>>()?,
        None => Vec::new(),
    };

    let apply = builder.push(Step::ApplyPredictorRow(ApplyPredictorRowStep {
        namespace: namespace.clone(),
        predictor,
        row_dict,
    }));
    builder.push(Step::Project(ProjectStep { dataframe: apply, columns: select.targets.clone() }));

    Ok(builder.finish(Some(namespace), Vec::new()))
}

fn equality_conjunct_to_pair(expr: &Expr) -> PlanResult<(String, Expr)> {
    match expr {
        Expr::BinaryOperation(op) if op.op.eq_ignore_ascii_case("=") => {
            let (left, right) = op.args.as_ref();
            match left {
                Expr::Identifier(ident) => {
                    let name = ident.parts.last().cloned().unwrap_or_default();
                    Ok((name, right.clone()))
                }
                _ => Err(PlanningException::new(
                    "predictor-only WHERE conjuncts must have an identifier on the left of '='",
                )),
            }
        }
        _ => Err(PlanningException::new(
            "predictor-only WHERE must be a conjunction of 'column = value' equalities",
        )),
    }
}

fn strip_integration_prefix_in_place(select: &mut Select, integration: &str) {
    select.targets = select.targets.drain(..).map(|e| strip_prefix(e, integration)).collect();
    select.where_clause = select.where_clause.take().map(|e| strip_prefix(e, integration));
    select.group_by = select
        .group_by
        .take()
        .map(|items| items.into_iter().map(|e| strip_prefix(e, integration)).collect());
    select.having = select.having.take().map(|e| strip_prefix(e, integration));
    if let Some(order_by) = select.order_by.take() {
        select.order_by = Some(
            order_by
                .into_iter()
                .map(|mut o| {
                    o.field = strip_prefix(o.field, integration);
                    o
                })
                .collect(),
        );
    }
}

pub(crate) fn classify_single(select: &Select, ident: &Identifier, opts: &PlannerOptions) -> PlanResult<QueryPlan> {
    match crate::shape::classify(ident, opts)? {
        Side::Integration { integration, table } => plan_single_integration(select, integration, table),
        Side::Predictor { namespace, name } => plan_predictor_only(select, namespace, name),
    }
}
