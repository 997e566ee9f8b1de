// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration × time-series-predictor join planning (`SPEC_FULL.md` §4.6) —
//! the most intricate shape: a distinct-group-keys fetch, a `MapReduce`
//! scatter templated on the WHERE's time predicate, the predictor
//! application, and a final left join back onto the windowed history.

use mindsdb_sql_ast::{
    BetweenOperation, BinaryOperation, Constant, Expr, FromTable, Identifier, Join, JoinType,
    NullsOrder, OrderBy, Select, SortDirection, Star,
};

use crate::error::{PlanningException, PlanResult};
use crate::plan::{PlanBuilder, QueryPlan};
use crate::rewrite::and_conjuncts;
use crate::shape::reference_name;
use crate::step::{
    ApplyTimeseriesPredictorStep, FetchDataframeStep, JoinStep, LimitOffsetStep, MapReduceStep,
    MultipleStepsStep, ProjectStep, Step,
};
use crate::PredictorMetadata;

/// The row-placeholder substituted with each group value at reduce time
/// (`SPEC_FULL.md` §3 "MapReduce step").
const GROUP_VAR: &str = "$var";

#[derive(Debug, Clone)]
enum TimeKind {
    GreaterLatest,
    LessThan { value: Expr, strict: bool },
    GreaterThan { value: Expr, strict: bool },
    Between { low: Expr, high: Expr },
}

struct Decomposed {
    group_conjunct: Option<Expr>,
    time_original: Option<Expr>,
    time_kind: Option<TimeKind>,
}

pub(crate) fn plan(
    select: &Select,
    _join: &Join,
    integration: String,
    table: Identifier,
    namespace: String,
    predictor: Identifier,
    meta: &PredictorMetadata,
) -> PlanResult<QueryPlan> {
    let table_ref = reference_name(&table);
    let predictor_ref = reference_name(&predictor);
    let decomposed =
        decompose_where(select.where_clause.as_ref(), &meta.order_by_column, &meta.group_by_column)?;

    let ctx = TemplateContext {
        integration: integration.clone(),
        table: table.clone(),
        table_ref: table_ref.clone(),
        order_col: meta.order_by_column.clone(),
        group_col: meta.group_by_column.clone(),
        window: meta.window,
    };

    let mut builder = PlanBuilder::new();

    // Step 0: distinct group keys.
    let group_target = Identifier::new(vec![table_ref.clone(), meta.group_by_column.clone()])
        .with_alias(meta.group_by_column.clone());
    let mut distinct_select = Select::new(vec![Expr::Identifier(group_target)]);
    distinct_select.distinct = true;
    distinct_select.from_table = Some(Box::new(FromTable::Identifier(table.clone())));
    distinct_select.where_clause = decomposed.group_conjunct.clone();
    let groups = builder.push(Step::FetchDataframe(FetchDataframeStep {
        integration: integration.clone(),
        query: distinct_select,
    }));

    // Step 1: MapReduce scatter over the distinct groups.
    let template = build_template(&ctx, &decomposed.time_kind);
    let scatter = builder.push(Step::MapReduce(MapReduceStep {
        values: groups,
        reduce: "union".to_string(),
        step: Box::new(template),
    }));

    // Step 2: run the predictor over the scattered windows.
    let applied = builder.push(Step::ApplyTimeseriesPredictor(ApplyTimeseriesPredictorStep {
        namespace: namespace.clone(),
        predictor: predictor.clone(),
        dataframe: scatter,
        output_time_filter: decomposed.time_original.clone(),
    }));

    // Step 3: left join the predictions back onto the windowed history.
    let synthetic_join = Join {
        left: FromTable::Identifier(Identifier::new(vec!["result_2"]).with_alias(predictor_ref)),
        right: FromTable::Identifier(Identifier::new(vec!["result_1"]).with_alias(table_ref)),
        join_type: JoinType::Left,
        condition: None,
        implicit: false,
    };
    let mut last = builder.push(Step::Join(JoinStep { left: applied, right: scatter, query: synthetic_join }));

    if select.limit.is_some() || select.offset.is_some() {
        last = builder.push(Step::LimitOffset(LimitOffsetStep {
            dataframe: last,
            limit: select.limit.clone(),
            offset: select.offset.clone(),
        }));
    }

    builder.push(Step::Project(ProjectStep { dataframe: last, columns: select.targets.clone() }));

    Ok(builder.finish(Some(namespace), vec![integration]))
}

fn decompose_where(where_expr: Option<&Expr>, order_col: &str, group_col: &str) -> PlanResult<Decomposed> {
    let Some(where_expr) = where_expr else {
        return Ok(Decomposed { group_conjunct: None, time_original: None, time_kind: None });
    };

    let mut group_conjunct = None;
    let mut time_original = None;
    let mut time_kind = None;

    for conjunct in and_conjuncts(where_expr) {
        match classify_conjunct(&conjunct, order_col, group_col)? {
            Conjunct::Group => {
                if group_conjunct.is_some() {
                    return Err(PlanningException::new(format!(
                        "time-series WHERE may only equate '{group_col}' once"
                    )));
                }
                group_conjunct = Some(conjunct);
            }
            Conjunct::Time(kind) => {
                if time_kind.is_some() {
                    return Err(PlanningException::new(format!(
                        "time-series WHERE may only constrain '{order_col}' once"
                    )));
                }
                time_original = Some(conjunct);
                time_kind = Some(kind);
            }
        }
    }

    Ok(Decomposed { group_conjunct, time_original, time_kind })
}

enum Conjunct {
    Group,
    Time(TimeKind),
}

fn classify_conjunct(expr: &Expr, order_col: &str, group_col: &str) -> PlanResult<Conjunct> {
    match expr {
        Expr::BinaryOperation(op) if &*op.op == "=" => {
            let (left, _right) = op.args.as_ref();
            match column_name(left) {
                Some(name) if name == group_col => Ok(Conjunct::Group),
                Some(name) if name == order_col => Err(PlanningException::new(format!(
                    "time-series WHERE cannot equate time column '{order_col}'"
                ))),
                _ => Err(PlanningException::new(format!(
                    "time-series WHERE references an unknown column in '{expr}'"
                ))),
            }
        }
        Expr::BinaryOperation(op) if matches!(&*op.op, "<" | "<=" | ">" | ">=") => {
            let (left, right) = op.args.as_ref();
            match column_name(left) {
                Some(name) if name == order_col => {
                    if &*op.op == ">" && matches!(right, Expr::Latest(_)) {
                        return Ok(Conjunct::Time(TimeKind::GreaterLatest));
                    }
                    let kind = match &*op.op {
                        "<" => TimeKind::LessThan { value: right.clone(), strict: true },
                        "<=" => TimeKind::LessThan { value: right.clone(), strict: false },
                        ">" => TimeKind::GreaterThan { value: right.clone(), strict: true },
                        ">=" => TimeKind::GreaterThan { value: right.clone(), strict: false },
                        _ => unreachable!(),
                    };
                    Ok(Conjunct::Time(kind))
                }
                _ => Err(PlanningException::new(format!(
                    "time-series WHERE references an unknown column in '{expr}'"
                ))),
            }
        }
        Expr::BetweenOperation(op) => {
            let (e, low, high) = op.args.as_ref();
            match column_name(e) {
                Some(name) if name == order_col => {
                    Ok(Conjunct::Time(TimeKind::Between { low: low.clone(), high: high.clone() }))
                }
                _ => Err(PlanningException::new(format!(
                    "time-series WHERE references an unknown column in '{expr}'"
                ))),
            }
        }
        other => Err(PlanningException::new(format!(
            "time-series WHERE must be a top-level AND of a time predicate and group equalities, found '{other}'"
        ))),
    }
}

fn column_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Identifier(ident) => ident.parts.last().cloned(),
        _ => None,
    }
}

/// Everything a per-row fetch template needs, gathered up front so
/// `build_template`'s match arms stay about the predicate shape, not about
/// threading five scalar parameters through each branch.
struct TemplateContext {
    integration: String,
    table: Identifier,
    table_ref: String,
    order_col: String,
    group_col: String,
    window: i64,
}

impl TemplateContext {
    fn group_filter(&self) -> Expr {
        Expr::BinaryOperation(BinaryOperation::new(
            "=",
            Expr::Identifier(Identifier::new(vec![self.table_ref.clone(), self.group_col.clone()])),
            Expr::Identifier(Identifier::new(vec![GROUP_VAR.to_string()])),
        ))
    }

    fn order_ident(&self) -> Expr {
        Expr::Identifier(Identifier::new(vec![self.table_ref.clone(), self.order_col.clone()]))
    }

    fn time_comparison(&self, op: &str, value: &Expr) -> Expr {
        Expr::BinaryOperation(BinaryOperation::new(op, self.order_ident(), value.clone()))
    }

    fn desc_order(&self) -> Vec<OrderBy> {
        vec![OrderBy { field: self.order_ident(), direction: SortDirection::Desc, nulls: NullsOrder::Default }]
    }

    fn fetch_step(&self, where_expr: Expr, limit: Option<i64>) -> Step {
        let mut select = Select::new(vec![Expr::Star(Star)]);
        select.from_table = Some(Box::new(FromTable::Identifier(self.table.clone())));
        select.where_clause = Some(where_expr);
        select.order_by = Some(self.desc_order());
        select.limit = limit.map(|w| Expr::Constant(Constant::integer(w)));
        Step::FetchDataframe(FetchDataframeStep { integration: self.integration.clone(), query: select })
    }
}

fn and2(a: Expr, b: Expr) -> Expr {
    Expr::BinaryOperation(BinaryOperation::new("and", a, b))
}

/// Builds the per-row template for the `MapReduceStep`, shaped by the
/// original time predicate (`SPEC_FULL.md` §4.6's predicate → template
/// table).
fn build_template(ctx: &TemplateContext, time_kind: &Option<TimeKind>) -> Step {
    let group = ctx.group_filter();

    match time_kind {
        None => ctx.fetch_step(group, None),
        Some(TimeKind::GreaterLatest) => ctx.fetch_step(group, Some(ctx.window)),
        Some(TimeKind::LessThan { value, strict }) => {
            let op = if *strict { "<" } else { "<=" };
            let where_expr = and2(group, ctx.time_comparison(op, value));
            ctx.fetch_step(where_expr, None)
        }
        Some(TimeKind::GreaterThan { value, strict }) => {
            let history_op = if *strict { "<=" } else { "<" };
            let history_where = and2(group.clone(), ctx.time_comparison(history_op, value));
            let history = ctx.fetch_step(history_where, Some(ctx.window));

            let forecast_op = if *strict { ">" } else { ">=" };
            let forecast_where = and2(group, ctx.time_comparison(forecast_op, value));
            let forecast = ctx.fetch_step(forecast_where, None);

            Step::MultipleSteps(MultipleStepsStep { steps: vec![history, forecast], reduce: "union".to_string() })
        }
        Some(TimeKind::Between { low, high }) => {
            let history_where = and2(group.clone(), ctx.time_comparison("<", low));
            let history = ctx.fetch_step(history_where, Some(ctx.window));

            let between_expr =
                Expr::BetweenOperation(BetweenOperation::new(ctx.order_ident(), low.clone(), high.clone()));
            let forecast_where = and2(group, between_expr);
            let forecast = ctx.fetch_step(forecast_where, None);

            Step::MultipleSteps(MultipleStepsStep { steps: vec![history, forecast], reduce: "union".to_string() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindsdb_sql_ast::Dialect;
    use mindsdb_sql_parser::parse_sql;

    fn meta() -> PredictorMetadata {
        PredictorMetadata {
            timeseries: true,
            order_by_column: "pickup_hour".to_string(),
            group_by_column: "vendor_id".to_string(),
            window: 10,
        }
    }

    fn plan_select(sql: &str) -> QueryPlan {
        let stmt = parse_sql(sql, Dialect::MindsDb).unwrap();
        let select = stmt.as_select().unwrap().clone();
        let FromTable::Join(join) = select.from_table.clone().unwrap().as_ref().clone() else {
            panic!("expected join")
        };
        plan(
            &select,
            &join,
            "mysql".to_string(),
            Identifier::new(vec!["ny_output"]).with_alias("ta"),
            "mindsdb".to_string(),
            Identifier::new(vec!["tp3"]).with_alias("tb"),
            &meta(),
        )
        .unwrap()
    }

    #[test]
    fn greater_than_produces_history_and_forecast_scatter() {
        let plan = plan_select(
            "SELECT * FROM mysql.ny_output ta JOIN mindsdb.tp3 tb WHERE ta.pickup_hour > 10 AND ta.vendor_id = 1",
        );
        assert_eq!(plan.steps.len(), 5);
        let Step::MapReduce(mr) = &plan.steps[1] else { panic!("expected MapReduce") };
        let Step::MultipleSteps(ms) = mr.step.as_ref() else { panic!("expected MultipleSteps template") };
        assert_eq!(ms.steps.len(), 2);
        let Step::FetchDataframe(history) = &ms.steps[0] else { panic!() };
        assert_eq!(history.query.limit, Some(Expr::Constant(Constant::integer(10))));
        let Step::FetchDataframe(forecast) = &ms.steps[1] else { panic!() };
        assert!(forecast.query.limit.is_none());
    }

    #[test]
    fn latest_predicate_yields_history_only_template() {
        let plan = plan_select(
            "SELECT * FROM mysql.ny_output ta JOIN mindsdb.tp3 tb WHERE ta.pickup_hour > LATEST AND ta.vendor_id = 1",
        );
        let Step::MapReduce(mr) = &plan.steps[1] else { panic!("expected MapReduce") };
        assert!(matches!(mr.step.as_ref(), Step::FetchDataframe(_)));
        let Step::ApplyTimeseriesPredictor(apply) = &plan.steps[2] else { panic!() };
        assert!(matches!(apply.output_time_filter, Some(Expr::BinaryOperation(_))));
    }

    #[test]
    fn no_time_predicate_still_scatters_on_group() {
        let plan = plan_select("SELECT * FROM mysql.ny_output ta JOIN mindsdb.tp3 tb WHERE ta.vendor_id = 1");
        assert_eq!(plan.steps.len(), 5);
        let Step::ApplyTimeseriesPredictor(apply) = &plan.steps[2] else { panic!() };
        assert!(apply.output_time_filter.is_none());
    }

    #[test]
    fn between_predicate_produces_history_and_between_scatter() {
        let plan = plan_select(
            "SELECT * FROM mysql.ny_output ta JOIN mindsdb.tp3 tb WHERE ta.pickup_hour BETWEEN 5 AND 10 AND ta.vendor_id = 1",
        );
        let Step::MapReduce(mr) = &plan.steps[1] else { panic!() };
        let Step::MultipleSteps(ms) = mr.step.as_ref() else { panic!() };
        let Step::FetchDataframe(forecast) = &ms.steps[1] else { panic!() };
        assert!(matches!(forecast.query.where_clause, Some(Expr::BinaryOperation(_))));
    }

    #[test]
    fn unknown_column_in_where_is_rejected() {
        let stmt = parse_sql(
            "SELECT * FROM mysql.ny_output ta JOIN mindsdb.tp3 tb WHERE ta.unknown_col = 1",
            Dialect::MindsDb,
        )
        .unwrap();
        let select = stmt.as_select().unwrap().clone();
        let FromTable::Join(join) = select.from_table.clone().unwrap().as_ref().clone() else { panic!() };
        let err = plan(
            &select,
            &join,
            "mysql".to_string(),
            Identifier::new(vec!["ny_output"]).with_alias("ta"),
            "mindsdb".to_string(),
            Identifier::new(vec!["tp3"]).with_alias("tb"),
            &meta(),
        )
        .unwrap_err();
        assert!(err.message.contains("unknown column"));
    }
}
