// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! The planner's single error type, mirroring `ParsingException`'s shape
//! (`SPEC_FULL.md` §2A.2, §7).

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct PlanningException {
    pub message: String,
}

impl PlanningException {
    pub fn new(message: impl Into<String>) -> PlanningException {
        PlanningException { message: message.into() }
    }
}

pub type PlanResult<T> = Result<T, PlanningException>;
