// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! SQL dialect identifiers.
//!
//! Three dialects are supported: a baseline SQLite-like core, MySQL (adding
//! server/session variables), and `MindsDb`, an extension of MySQL adding
//! model-training/usage statements and the `LATEST` temporal literal.

use serde::{Deserialize, Serialize};

/// Which SQL dialect a lex/parse call should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    Sqlite,
    MySql,
    MindsDb,
}

impl Dialect {
    /// `true` for dialects that lex `@var` / `@@var` variables.
    pub fn has_variables(self) -> bool {
        matches!(self, Dialect::MySql | Dialect::MindsDb)
    }

    /// `true` for the dialect that understands predictor DDL and `LATEST`.
    pub fn is_mindsdb(self) -> bool {
        matches!(self, Dialect::MindsDb)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::MySql => "mysql",
            Dialect::MindsDb => "mindsdb",
        }
    }

    pub fn parse(s: &str) -> Option<Dialect> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Some(Dialect::Sqlite),
            "mysql" => Some(Dialect::MySql),
            "mindsdb" => Some(Dialect::MindsDb),
            _ => None,
        }
    }
}
