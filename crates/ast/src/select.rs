// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! `SELECT` and its clauses: `Select`, `Join`, `OrderBy`.
//!
//! ```text
//! SELECT column AS c FROM t WHERE x != 1 GROUP BY g HAVING g > 0
//!   ORDER BY c DESC LIMIT 5 OFFSET 3
//! ```
//! parses to a `Select` with every optional clause populated; see
//! `SPEC_FULL.md` §4.2 for the clause-ordering and uniqueness rules enforced
//! by the parser before this value is ever constructed.

use std::fmt;

use crate::expr::{Expr, Identifier};
use crate::tree::indent;

/// The FROM-clause shape: a bare table, a join of two such shapes, or a
/// parenthesized subquery.
#[derive(Debug, Clone, PartialEq)]
pub enum FromTable {
    Identifier(Identifier),
    Join(Box<Join>),
    Subquery(Box<Select>),
}

impl FromTable {
    pub fn to_tree(&self, level: usize) -> String {
        match self {
            FromTable::Identifier(i) => i.to_tree(level),
            FromTable::Join(j) => j.to_tree(level),
            FromTable::Subquery(s) => s.to_tree(level),
        }
    }
}

impl fmt::Display for FromTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FromTable::Identifier(i) => write!(f, "{i}"),
            FromTable::Join(j) => write!(f, "{j}"),
            FromTable::Subquery(s) => write!(f, "({s})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinType::Inner => "JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
        }
    }
}

/// `left <join_type> right [ON condition]`. `implicit = true` marks the
/// comma-join form (`FROM t1, t2`), which always has `condition = None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub left: FromTable,
    pub right: FromTable,
    pub join_type: JoinType,
    pub condition: Option<Expr>,
    pub implicit: bool,
}

impl Join {
    pub fn implicit(left: FromTable, right: FromTable) -> Join {
        Join { left, right, join_type: JoinType::Inner, condition: None, implicit: true }
    }

    pub fn explicit(left: FromTable, right: FromTable, join_type: JoinType, condition: Option<Expr>) -> Join {
        Join { left, right, join_type, condition, implicit: false }
    }

    pub fn to_tree(&self, level: usize) -> String {
        let ind = indent(level);
        let cond = match &self.condition {
            Some(c) => format!(",\n{}", c.to_tree(level + 1)),
            None => String::new(),
        };
        format!(
            "{ind}Join(join_type={:?}, implicit={},\n{},\n{}{cond}\n{ind})",
            self.join_type,
            self.implicit,
            self.left.to_tree(level + 1),
            self.right.to_tree(level + 1)
        )
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.implicit {
            write!(f, "{}, {}", self.left, self.right)
        } else {
            write!(f, "{} {} {}", self.left, self.join_type.as_sql(), self.right)?;
            if let Some(cond) = &self.condition {
                write!(f, " ON {cond}")?;
            }
            Ok(())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Default,
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullsOrder {
    #[default]
    Default,
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: Expr,
    pub direction: SortDirection,
    pub nulls: NullsOrder,
}

impl OrderBy {
    pub fn new(field: Expr) -> OrderBy {
        OrderBy { field, direction: SortDirection::Default, nulls: NullsOrder::Default }
    }

    pub fn with_direction(mut self, direction: SortDirection) -> OrderBy {
        self.direction = direction;
        self
    }

    pub fn with_nulls(mut self, nulls: NullsOrder) -> OrderBy {
        self.nulls = nulls;
        self
    }

    pub fn to_tree(&self, level: usize) -> String {
        let ind = indent(level);
        format!(
            "{ind}OrderBy(direction={:?}, nulls={:?},\n{}\n{ind})",
            self.direction,
            self.nulls,
            self.field.to_tree(level + 1)
        )
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field)?;
        match self.direction {
            SortDirection::Default => {}
            SortDirection::Asc => write!(f, " ASC")?,
            SortDirection::Desc => write!(f, " DESC")?,
        }
        match self.nulls {
            NullsOrder::Default => {}
            NullsOrder::First => write!(f, " NULLS FIRST")?,
            NullsOrder::Last => write!(f, " NULLS LAST")?,
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Select {
    pub targets: Vec<Expr>,
    pub from_table: Option<Box<FromTable>>,
    pub where_clause: Option<Expr>,
    pub group_by: Option<Vec<Expr>>,
    pub having: Option<Expr>,
    pub order_by: Option<Vec<OrderBy>>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
    pub distinct: bool,
    pub alias: Option<String>,
    pub parentheses: bool,
}

impl Select {
    pub fn new(targets: Vec<Expr>) -> Select {
        Select { targets, ..Default::default() }
    }

    pub fn with_from(mut self, from_table: FromTable) -> Select {
        self.from_table = Some(Box::new(from_table));
        self
    }

    pub fn with_where(mut self, expr: Expr) -> Select {
        self.where_clause = Some(expr);
        self
    }

    pub fn with_parentheses(mut self) -> Select {
        self.parentheses = true;
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Select {
        self.alias = Some(alias.into());
        self
    }

    pub fn to_tree(&self, level: usize) -> String {
        let ind = indent(level);
        let mut parts = Vec::new();
        let targets: Vec<String> = self.targets.iter().map(|t| t.to_tree(level + 2)).collect();
        parts.push(format!("{}targets=[\n{}\n{}]", indent(level + 1), targets.join(",\n"), indent(level + 1)));
        if let Some(f) = &self.from_table {
            parts.push(format!("{}from_table=\n{}", indent(level + 1), f.to_tree(level + 2)));
        }
        if let Some(w) = &self.where_clause {
            parts.push(format!("{}where=\n{}", indent(level + 1), w.to_tree(level + 2)));
        }
        if let Some(g) = &self.group_by {
            let items: Vec<String> = g.iter().map(|e| e.to_tree(level + 2)).collect();
            parts.push(format!("{}group_by=[\n{}\n{}]", indent(level + 1), items.join(",\n"), indent(level + 1)));
        }
        if let Some(h) = &self.having {
            parts.push(format!("{}having=\n{}", indent(level + 1), h.to_tree(level + 2)));
        }
        if let Some(o) = &self.order_by {
            let items: Vec<String> = o.iter().map(|e| e.to_tree(level + 2)).collect();
            parts.push(format!("{}order_by=[\n{}\n{}]", indent(level + 1), items.join(",\n"), indent(level + 1)));
        }
        if let Some(l) = &self.limit {
            parts.push(format!("{}limit=\n{}", indent(level + 1), l.to_tree(level + 2)));
        }
        if let Some(o) = &self.offset {
            parts.push(format!("{}offset=\n{}", indent(level + 1), o.to_tree(level + 2)));
        }
        parts.push(format!("{}distinct={}", indent(level + 1), self.distinct));
        format!("{ind}Select(\n{}\n{ind})", parts.join(",\n"))
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::from("SELECT ");
        if self.distinct {
            out.push_str("DISTINCT ");
        }
        let targets: Vec<String> = self.targets.iter().map(|t| t.to_string()).collect();
        out.push_str(&targets.join(", "));
        if let Some(from) = &self.from_table {
            out.push_str(" FROM ");
            out.push_str(&from.to_string());
        }
        if let Some(w) = &self.where_clause {
            out.push_str(" WHERE ");
            out.push_str(&w.to_string());
        }
        if let Some(g) = &self.group_by {
            out.push_str(" GROUP BY ");
            let items: Vec<String> = g.iter().map(|e| e.to_string()).collect();
            out.push_str(&items.join(", "));
        }
        if let Some(h) = &self.having {
            out.push_str(" HAVING ");
            out.push_str(&h.to_string());
        }
        if let Some(o) = &self.order_by {
            out.push_str(" ORDER BY ");
            let items: Vec<String> = o.iter().map(|e| e.to_string()).collect();
            out.push_str(&items.join(", "));
        }
        if let Some(l) = &self.limit {
            out.push_str(" LIMIT ");
            out.push_str(&l.to_string());
        }
        if let Some(o) = &self.offset {
            out.push_str(" OFFSET ");
            out.push_str(&o.to_string());
        }
        if self.parentheses {
            write!(f, "({out})")?;
        } else {
            write!(f, "{out}")?;
        }
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}
