// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Classifies a `FROM`-clause side as an integration table or a predictor,
//! per the namespace rules in `SPEC_FULL.md` §4.3.

use mindsdb_sql_ast::Identifier;

use crate::error::PlanResult;
use crate::PlannerOptions;

#[derive(Debug, Clone)]
pub(crate) enum Side {
    Integration { integration: String, table: Identifier },
    Predictor { namespace: String, name: Identifier },
}

/// `int.tab1` (2+ parts, first segment a registered integration) or
/// `tab1` (1 part, attributed to `default_namespace` when set).
pub(crate) fn classify(ident: &Identifier, opts: &PlannerOptions) -> PlanResult<Side> {
    if !ident.parts.is_empty() && ident.parts[0].eq_ignore_ascii_case(&opts.predictor_namespace) {
        let rest = &ident.parts[1..];
        if rest.is_empty() {
            return Err(crate::error::PlanningException::new(format!(
                "predictor reference '{ident}' is missing a predictor name"
            )));
        }
        let mut name = Identifier::new(rest.to_vec());
        if let Some(alias) = &ident.alias {
            name = name.with_alias(alias.clone());
        }
        return Ok(Side::Predictor { namespace: opts.predictor_namespace.clone(), name });
    }

    if ident.parts.len() >= 2 && opts.integrations.iter().any(|i| i == &ident.parts[0]) {
        let integration = ident.parts[0].clone();
        let mut table = Identifier::new(ident.parts[1..].to_vec());
        if let Some(alias) = &ident.alias {
            table = table.with_alias(alias.clone());
        }
        return Ok(Side::Integration { integration, table });
    }

    if ident.parts.len() == 1 {
        if let Some(default_ns) = &opts.default_namespace {
            let mut table = Identifier::new(ident.parts.clone());
            if let Some(alias) = &ident.alias {
                table = table.with_alias(alias.clone());
            }
            return Ok(Side::Integration { integration: default_ns.clone(), table });
        }
    }

    Err(crate::error::PlanningException::new(format!(
        "'{ident}' does not resolve to a known integration or the predictor namespace"
    )))
}

/// The effective table-reference name used to attribute identifiers in a
/// `JOIN` condition or `WHERE` clause back to a side: the alias if present,
/// otherwise the last identifier segment.
pub(crate) fn reference_name(ident: &Identifier) -> String {
    ident.alias.clone().unwrap_or_else(|| ident.parts.last().cloned().unwrap_or_default())
}
