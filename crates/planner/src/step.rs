// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! The planning-step sum type (`SPEC_FULL.md` §3 "Planning steps"). A
//! `Result(i)` handle is just the index of a prior step in the same plan —
//! no pointer graph, per `SPEC_FULL.md` §9.

use mindsdb_sql_ast::{Expr, Identifier, Join, OrderBy, Select};

/// Refers to the output of a previously emitted step. Forward references are
/// illegal: a step may only reference indices strictly less than its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultRef(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    FetchDataframe(FetchDataframeStep),
    ApplyPredictor(ApplyPredictorStep),
    ApplyPredictorRow(ApplyPredictorRowStep),
    ApplyTimeseriesPredictor(ApplyTimeseriesPredictorStep),
    Join(JoinStep),
    Filter(FilterStep),
    Project(ProjectStep),
    GroupBy(GroupByStep),
    OrderBy(OrderByStep),
    LimitOffset(LimitOffsetStep),
    Union(UnionStep),
    MapReduce(MapReduceStep),
    MultipleSteps(MultipleStepsStep),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchDataframeStep {
    pub integration: String,
    pub query: Select,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplyPredictorStep {
    pub namespace: String,
    pub predictor: Identifier,
    pub dataframe: ResultRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplyPredictorRowStep {
    pub namespace: String,
    pub predictor: Identifier,
    pub row_dict: Vec<(String, Expr)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplyTimeseriesPredictorStep {
    pub namespace: String,
    pub predictor: Identifier,
    pub dataframe: ResultRef,
    pub output_time_filter: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinStep {
    pub left: ResultRef,
    pub right: ResultRef,
    pub query: Join,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterStep {
    pub dataframe: ResultRef,
    pub query: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectStep {
    pub dataframe: ResultRef,
    pub columns: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupByStep {
    pub dataframe: ResultRef,
    pub targets: Vec<Expr>,
    pub columns: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByStep {
    pub dataframe: ResultRef,
    pub order_by: Vec<OrderBy>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LimitOffsetStep {
    pub dataframe: ResultRef,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnionStep {
    pub left: ResultRef,
    pub right: ResultRef,
    pub unique: bool,
}

/// Scatter: run `step` once per row of `values`, substituting `$var`,
/// reducing the per-row outputs by `reduce`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapReduceStep {
    pub values: ResultRef,
    pub reduce: String,
    pub step: Box<Step>,
}

/// A static multi-step union used inside a `MapReduceStep` template, rather
/// than a reference to earlier plan steps.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipleStepsStep {
    pub steps: Vec<Step>,
    pub reduce: String,
}
