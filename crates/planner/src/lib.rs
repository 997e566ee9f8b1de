// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Top-level `plan_query` entry point (`SPEC_FULL.md` §4.3): dispatches a
//! `SELECT` AST by its `FROM` shape to one of the planning shapes in
//! `single`, `join_tables`, `join_predictor`, or `ts_predictor`.
//!
//! Every other `Statement` variant "passes through unplanned" — there is no
//! rewrite to perform, so `plan_query` hands back an empty `QueryPlan`
//! rather than touching them.

pub mod error;
mod join_predictor;
mod join_tables;
mod plan;
mod rewrite;
mod shape;
mod single;
mod step;
mod ts_predictor;

pub use error::{PlanResult, PlanningException};
pub use plan::QueryPlan;
pub use step::{
    ApplyPredictorRowStep, ApplyPredictorStep, ApplyTimeseriesPredictorStep, FetchDataframeStep,
    FilterStep, GroupByStep, JoinStep, LimitOffsetStep, MapReduceStep, MultipleStepsStep,
    OrderByStep, ProjectStep, ResultRef, Step, UnionStep,
};

use std::collections::HashMap;

use mindsdb_sql_ast::{FromTable, Select, Statement};

use shape::Side;

/// Per-predictor facts the planner needs but cannot derive from the AST:
/// whether it's a time-series predictor and, if so, the columns and window
/// that shape its scatter (`SPEC_FULL.md` §4.3, §4.6).
#[derive(Debug, Clone, Default)]
pub struct PredictorMetadata {
    pub timeseries: bool,
    pub order_by_column: String,
    pub group_by_column: String,
    pub window: i64,
}

/// `plan_query`'s inputs beyond the query itself (`SPEC_FULL.md` §4.3).
#[derive(Debug, Clone)]
pub struct PlannerOptions {
    pub integrations: Vec<String>,
    pub predictor_namespace: String,
    pub default_namespace: Option<String>,
    pub predictor_metadata: HashMap<String, PredictorMetadata>,
}

impl Default for PlannerOptions {
    fn default() -> PlannerOptions {
        PlannerOptions {
            integrations: Vec::new(),
            predictor_namespace: "mindsdb".to_string(),
            default_namespace: None,
            predictor_metadata: HashMap::new(),
        }
    }
}

impl PlannerOptions {
    pub fn new(integrations: Vec<String>) -> PlannerOptions {
        PlannerOptions { integrations, ..Default::default() }
    }

    pub fn with_default_namespace(mut self, ns: impl Into<String>) -> PlannerOptions {
        self.default_namespace = Some(ns.into());
        self
    }

    pub fn with_predictor_namespace(mut self, ns: impl Into<String>) -> PlannerOptions {
        self.predictor_namespace = ns.into();
        self
    }

    pub fn with_predictor(mut self, name: impl Into<String>, metadata: PredictorMetadata) -> PlannerOptions {
        self.predictor_metadata.insert(name.into(), metadata);
        self
    }

    fn metadata_for(&self, name: &Identifier) -> Option<&PredictorMetadata> {
        let key = name.parts.last()?;
        self.predictor_metadata.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)).map(|(_, v)| v)
    }
}

use mindsdb_sql_ast::Identifier;

/// Entry point: rewrite `statement` into an ordered `QueryPlan`. Only the
/// `Select` variant is rewritten; every other statement "passes through
/// unplanned" and yields an empty plan (`SPEC_FULL.md` §4.3).
pub fn plan_query(statement: &Statement, opts: &PlannerOptions) -> PlanResult<QueryPlan> {
    match statement.as_select() {
        Some(select) => plan_select(select, opts),
        None => Ok(QueryPlan::default()),
    }
}

fn plan_select(select: &Select, opts: &PlannerOptions) -> PlanResult<QueryPlan> {
    let Some(from_table) = &select.from_table else {
        return Err(PlanningException::new("SELECT without a FROM clause cannot be planned"));
    };

    match from_table.as_ref() {
        FromTable::Identifier(ident) => single::classify_single(select, ident, opts),
        FromTable::Join(join) => {
            let (FromTable::Identifier(left_ident), FromTable::Identifier(right_ident)) =
                (&join.left, &join.right)
            else {
                return Err(PlanningException::new(
                    "only a join of two bare table/predictor references can be planned",
                ));
            };

            let left = shape::classify(left_ident, opts)?;
            let right = shape::classify(right_ident, opts)?;

            match (left, right) {
                (
                    Side::Integration { integration: li, table: lt },
                    Side::Integration { integration: ri, table: rt },
                ) => join_tables::plan(select, join, li, lt, ri, rt),

                (
                    Side::Integration { integration, table },
                    Side::Predictor { namespace, name },
                ) => plan_table_predictor_join(select, join, integration, table, namespace, name, opts),

                (
                    Side::Predictor { namespace, name },
                    Side::Integration { integration, table },
                ) => plan_table_predictor_join(select, join, integration, table, namespace, name, opts),

                (Side::Predictor { .. }, Side::Predictor { .. }) => {
                    Err(PlanningException::new("cannot join two predictors"))
                }
            }
        }
        FromTable::Subquery(_) => {
            Err(PlanningException::new("planning a subquery FROM clause is not supported"))
        }
    }
}

fn plan_table_predictor_join(
    select: &Select,
    join: &mindsdb_sql_ast::Join,
    integration: String,
    table: Identifier,
    namespace: String,
    predictor: Identifier,
    opts: &PlannerOptions,
) -> PlanResult<QueryPlan> {
    match opts.metadata_for(&predictor) {
        Some(meta) if meta.timeseries => {
            ts_predictor::plan(select, join, integration, table, namespace, predictor, meta)
        }
        _ => join_predictor::plan(select, join, integration, table, namespace, predictor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindsdb_sql_parser::parse_sql;
    use mindsdb_sql_ast::Dialect;

    fn plan(sql: &str, opts: &PlannerOptions) -> QueryPlan {
        let stmt = parse_sql(sql, Dialect::MindsDb).unwrap();
        plan_query(&stmt, opts).unwrap()
    }

    #[test]
    fn single_integration_table_fetches_then_projects() {
        let opts = PlannerOptions::new(vec!["int".to_string()]);
        let p = plan("SELECT a FROM int.t1", &opts);
        assert_eq!(p.steps.len(), 2);
        assert!(matches!(p.steps[0], Step::FetchDataframe(_)));
        assert!(matches!(p.steps.last().unwrap(), Step::Project(_)));
    }

    #[test]
    fn predictor_only_select_emits_apply_predictor_row() {
        let opts = PlannerOptions::new(vec!["int".to_string()]);
        let p = plan("SELECT x FROM mindsdb.pred WHERE a = 1 AND b = 2", &opts);
        match &p.steps[0] {
            Step::ApplyPredictorRow(s) => {
                assert_eq!(s.row_dict.len(), 2);
            }
            other => panic!("expected ApplyPredictorRow, got {other:?}"),
        }
    }

    #[test]
    fn non_select_statement_passes_through_unplanned() {
        let opts = PlannerOptions::default();
        let stmt = parse_sql("USE mindsdb", Dialect::MindsDb).unwrap();
        let p = plan_query(&stmt, &opts).unwrap();
        assert!(p.steps.is_empty());
    }

    #[test]
    fn table_predictor_join_dispatches_to_join_predictor_shape() {
        let opts = PlannerOptions::new(vec!["int".to_string()]);
        let p = plan("SELECT tab1.c, pred.p FROM int.tab1 JOIN mindsdb.pred", &opts);
        assert_eq!(p.steps.len(), 4);
        assert!(matches!(p.steps[0], Step::FetchDataframe(_)));
        assert!(matches!(p.steps[1], Step::ApplyPredictor(_)));
        assert!(matches!(p.steps[2], Step::Join(_)));
        assert!(matches!(p.steps[3], Step::Project(_)));
    }

    #[test]
    fn timeseries_predictor_join_dispatches_to_ts_shape() {
        let mut opts = PlannerOptions::new(vec!["mysql".to_string()]);
        opts = opts.with_predictor(
            "tp3",
            PredictorMetadata {
                timeseries: true,
                order_by_column: "pickup_hour".to_string(),
                group_by_column: "vendor_id".to_string(),
                window: 10,
            },
        );
        let sql = "SELECT * FROM mysql.ny_output ta JOIN mindsdb.tp3 tb WHERE ta.pickup_hour > 10 AND ta.vendor_id = 1";
        let p = plan(sql, &opts);
        assert_eq!(p.steps.len(), 5);
        assert!(matches!(p.steps[0], Step::FetchDataframe(_)));
        assert!(matches!(p.steps[1], Step::MapReduce(_)));
        assert!(matches!(p.steps[2], Step::ApplyTimeseriesPredictor(_)));
        assert!(matches!(p.steps[3], Step::Join(_)));
        assert!(matches!(p.steps[4], Step::Project(_)));
    }

    #[test]
    fn join_condition_referencing_unknown_table_is_rejected() {
        let opts = PlannerOptions::new(vec!["int".to_string()]);
        let stmt = parse_sql("SELECT a FROM int.t1 JOIN int.t2 ON other.id = t2.id", Dialect::MindsDb).unwrap();
        let err = plan_query(&stmt, &opts).unwrap_err();
        assert!(err.message.contains("not in the join"));
    }
}
