// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Top-level statements. `Select` is the only one the planner rewrites;
//! every other variant passes through `plan_query` untouched (`SPEC_FULL.md`
//! §4.3).

use std::fmt;

use crate::expr::{Expr, Identifier};
use crate::select::Select;
use crate::tree::indent;

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Select),
    Set(Set),
    Use(Use),
    StartTransaction,
    CommitTransaction,
    RollbackTransaction,
    Explain(Explain),
    AlterTable(AlterTable),
    CreatePredictor(CreatePredictor),
    DropPredictor(DropPredictor),
    RetrainPredictor(RetrainPredictor),
}

impl Statement {
    pub fn to_tree(&self, level: usize) -> String {
        match self {
            Statement::Select(s) => s.to_tree(level),
            Statement::Set(s) => s.to_tree(level),
            Statement::Use(s) => s.to_tree(level),
            Statement::StartTransaction => format!("{}StartTransaction()", indent(level)),
            Statement::CommitTransaction => format!("{}CommitTransaction()", indent(level)),
            Statement::RollbackTransaction => format!("{}RollbackTransaction()", indent(level)),
            Statement::Explain(s) => s.to_tree(level),
            Statement::AlterTable(s) => s.to_tree(level),
            Statement::CreatePredictor(s) => s.to_tree(level),
            Statement::DropPredictor(s) => s.to_tree(level),
            Statement::RetrainPredictor(s) => s.to_tree(level),
        }
    }

    pub fn as_select(&self) -> Option<&Select> {
        match self {
            Statement::Select(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select(s) => write!(f, "{s}"),
            Statement::Set(s) => write!(f, "{s}"),
            Statement::Use(s) => write!(f, "{s}"),
            Statement::StartTransaction => write!(f, "START TRANSACTION"),
            Statement::CommitTransaction => write!(f, "COMMIT"),
            Statement::RollbackTransaction => write!(f, "ROLLBACK"),
            Statement::Explain(s) => write!(f, "{s}"),
            Statement::AlterTable(s) => write!(f, "{s}"),
            Statement::CreatePredictor(s) => write!(f, "{s}"),
            Statement::DropPredictor(s) => write!(f, "{s}"),
            Statement::RetrainPredictor(s) => write!(f, "{s}"),
        }
    }
}

/// `SET autocommit` / `SET NAMES x` / `SET k = v`. See `DESIGN.md` Open
/// Question #1 for why `k = v` is kept as a bare `BinaryOperation` argument
/// rather than normalized into dedicated fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Set {
    pub category: Option<String>,
    pub arg: Option<Expr>,
}

impl Set {
    pub fn category(category: impl Into<String>) -> Set {
        Set { category: Some(category.into()), arg: None }
    }

    pub fn names(value: Identifier) -> Set {
        Set { category: Some("names".to_string()), arg: Some(Expr::Identifier(value)) }
    }

    pub fn assignment(expr: Expr) -> Set {
        Set { category: None, arg: Some(expr) }
    }

    pub fn to_tree(&self, level: usize) -> String {
        let ind = indent(level);
        let mut parts = Vec::new();
        if let Some(c) = &self.category {
            parts.push(format!("{}category={c}", indent(level + 1)));
        }
        if let Some(a) = &self.arg {
            parts.push(format!("{}arg=\n{}", indent(level + 1), a.to_tree(level + 2)));
        }
        format!("{ind}Set(\n{}\n{ind})", parts.join(",\n"))
    }
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SET")?;
        if let Some(category) = &self.category {
            if category == "names" {
                write!(f, " NAMES")?;
                if let Some(arg) = &self.arg {
                    write!(f, " {arg}")?;
                }
            } else {
                write!(f, " {category}")?;
            }
        } else if let Some(arg) = &self.arg {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// `USE db_name` (mindsdb dialect only).
#[derive(Debug, Clone, PartialEq)]
pub struct Use {
    pub value: Identifier,
}

impl Use {
    pub fn new(value: Identifier) -> Use {
        Use { value }
    }

    pub fn to_tree(&self, level: usize) -> String {
        let ind = indent(level);
        format!("{ind}Use(\nvalue=\n{},\n{ind})", self.value.to_tree(level + 2))
    }
}

impl fmt::Display for Use {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "USE {}", self.value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Explain {
    pub target: Identifier,
}

impl Explain {
    pub fn to_tree(&self, level: usize) -> String {
        let ind = indent(level);
        format!("{ind}Explain(target=\n{}\n{ind})", self.target.to_tree(level + 1))
    }
}

impl fmt::Display for Explain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EXPLAIN {}", self.target)
    }
}

/// `ALTER TABLE t (DISABLE|ENABLE) KEYS`. `arg` is the lower-cased trailing
/// clause text.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTable {
    pub target: Identifier,
    pub arg: String,
}

impl AlterTable {
    pub fn to_tree(&self, level: usize) -> String {
        let ind = indent(level);
        format!(
            "{ind}AlterTable(target=\n{},\n{}arg={}\n{ind})",
            self.target.to_tree(level + 1),
            indent(level + 1),
            self.arg
        )
    }
}

impl fmt::Display for AlterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALTER TABLE {} {}", self.target, self.arg.to_uppercase())
    }
}

/// `CREATE [OR REPLACE] PREDICTOR name FROM integration (query) PREDICT col
/// [ORDER BY col] [GROUP BY col] [WINDOW n] [USING k=v, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePredictor {
    pub name: Identifier,
    pub or_replace: bool,
    pub from_query: Option<Select>,
    pub from_integration: Option<Identifier>,
    pub predict: Vec<Identifier>,
    pub order_by: Option<Identifier>,
    pub group_by: Option<Identifier>,
    pub window: Option<i64>,
    pub using: Vec<(String, Expr)>,
}

impl CreatePredictor {
    pub fn to_tree(&self, level: usize) -> String {
        let ind = indent(level);
        format!(
            "{ind}CreatePredictor(name=\n{},\npredict={:?})",
            self.name.to_tree(level + 1),
            self.predict.iter().map(|p| p.to_string()).collect::<Vec<_>>()
        )
    }
}

impl fmt::Display for CreatePredictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE ")?;
        if self.or_replace {
            write!(f, "OR REPLACE ")?;
        }
        write!(f, "PREDICTOR {}", self.name)?;
        if let (Some(integration), Some(query)) = (&self.from_integration, &self.from_query) {
            write!(f, " FROM {integration} ({query})")?;
        }
        let predict: Vec<String> = self.predict.iter().map(|p| p.to_string()).collect();
        write!(f, " PREDICT {}", predict.join(", "))?;
        if let Some(order_by) = &self.order_by {
            write!(f, " ORDER BY {order_by}")?;
        }
        if let Some(group_by) = &self.group_by {
            write!(f, " GROUP BY {group_by}")?;
        }
        if let Some(window) = self.window {
            write!(f, " WINDOW {window}")?;
        }
        if !self.using.is_empty() {
            write!(f, " USING ")?;
            let using: Vec<String> = self.using.iter().map(|(k, v)| format!("{k} = {v}")).collect();
            write!(f, "{}", using.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropPredictor {
    pub name: Identifier,
}

impl DropPredictor {
    pub fn to_tree(&self, level: usize) -> String {
        format!("{}DropPredictor(name=\n{}\n{})", indent(level), self.name.to_tree(level + 1), indent(level))
    }
}

impl fmt::Display for DropPredictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DROP PREDICTOR {}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrainPredictor {
    pub name: Identifier,
}

impl RetrainPredictor {
    pub fn to_tree(&self, level: usize) -> String {
        format!("{}RetrainPredictor(name=\n{}\n{})", indent(level), self.name.to_tree(level + 1), indent(level))
    }
}

impl fmt::Display for RetrainPredictor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RETRAIN {}", self.name)
    }
}
