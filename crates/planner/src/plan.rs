// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! `QueryPlan` and the `PlanBuilder` that accumulates steps into it
//! (`SPEC_FULL.md` §3, §9).

use crate::step::{ResultRef, Step};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryPlan {
    pub steps: Vec<Step>,
    pub default_namespace: Option<String>,
    pub integrations: Vec<String>,
}

/// Accumulates steps and hands back the index of each as a `ResultRef`.
/// Holds no planning logic of its own — `dispatch.rs` and friends decide
/// what to push.
#[derive(Debug, Default)]
pub struct PlanBuilder {
    steps: Vec<Step>,
}

impl PlanBuilder {
    pub fn new() -> PlanBuilder {
        PlanBuilder::default()
    }

    pub fn push(&mut self, step: Step) -> ResultRef {
        self.steps.push(step);
        let idx = ResultRef(self.steps.len() - 1);
        tracing::debug!(target: "sql_planner", index = idx.0, "emitted step");
        idx
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn finish(self, default_namespace: Option<String>, integrations: Vec<String>) -> QueryPlan {
        QueryPlan { steps: self.steps, default_namespace, integrations }
    }
}
