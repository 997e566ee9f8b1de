// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Scalar and row-valued expression nodes.
//!
//! Every leaf node carries an optional `alias` and a `parentheses` flag
//! (forcing a SQL-text rendering to be wrapped in parens even where operator
//! precedence wouldn't require it), except `Star`, which is a bare `*` and
//! cannot be aliased.
//!
//! ```text
//! SELECT tab1.a AS x, (1 + 2) AS y FROM tab1
//! ```
//! lexes `tab1.a` to `Identifier{parts: ["tab1", "a"], alias: Some("x")}` and
//! `(1 + 2)` to `BinaryOperation{op: "+", args: [..], parentheses: true, alias: Some("y")}`.

use std::fmt;

use crate::select::Select;
use crate::tree::indent;

/// Any scalar or row-valued expression appearing in a target list, WHERE/HAVING
/// predicate, join condition, or ORDER BY key.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(Identifier),
    Constant(Constant),
    Star(Star),
    Parameter(Parameter),
    Variable(Variable),
    Latest(Latest),
    Tuple(Tuple),
    TypeCast(TypeCast),
    BinaryOperation(BinaryOperation),
    UnaryOperation(UnaryOperation),
    BetweenOperation(BetweenOperation),
    Function(Function),
    /// A SELECT nested as a scalar target, FROM source, or WHERE operand.
    /// Always rendered with `parentheses = true` inside `select.parentheses`.
    Subquery(Box<Select>),
}

impl Expr {
    pub fn alias(&self) -> Option<&str> {
        match self {
            Expr::Identifier(n) => n.alias.as_deref(),
            Expr::Constant(n) => n.alias.as_deref(),
            Expr::Star(_) => None,
            Expr::Parameter(n) => n.alias.as_deref(),
            Expr::Variable(n) => n.alias.as_deref(),
            Expr::Latest(_) => None,
            Expr::Tuple(n) => n.alias.as_deref(),
            Expr::TypeCast(n) => n.alias.as_deref(),
            Expr::BinaryOperation(n) => n.alias.as_deref(),
            Expr::UnaryOperation(n) => n.alias.as_deref(),
            Expr::BetweenOperation(n) => n.alias.as_deref(),
            Expr::Function(n) => n.alias.as_deref(),
            Expr::Subquery(n) => n.alias.as_deref(),
        }
    }

    pub fn ident(parts: impl IntoIterator<Item = impl Into<String>>) -> Expr {
        Expr::Identifier(Identifier::new(parts))
    }

    pub fn to_tree(&self, level: usize) -> String {
        match self {
            Expr::Identifier(n) => n.to_tree(level),
            Expr::Constant(n) => n.to_tree(level),
            Expr::Star(n) => n.to_tree(level),
            Expr::Parameter(n) => n.to_tree(level),
            Expr::Variable(n) => n.to_tree(level),
            Expr::Latest(n) => n.to_tree(level),
            Expr::Tuple(n) => n.to_tree(level),
            Expr::TypeCast(n) => n.to_tree(level),
            Expr::BinaryOperation(n) => n.to_tree(level),
            Expr::UnaryOperation(n) => n.to_tree(level),
            Expr::BetweenOperation(n) => n.to_tree(level),
            Expr::Function(n) => n.to_tree(level),
            Expr::Subquery(n) => n.to_tree(level),
        }
    }

    /// `true` for nodes whose operator is boolean-valued, used by the parser
    /// to enforce "WHERE must contain an operation that evaluates to a boolean".
    pub fn is_boolean_valued(&self) -> bool {
        match self {
            Expr::BinaryOperation(op) => op.op.is_boolean(),
            Expr::UnaryOperation(op) => op.op.eq_ignore_ascii_case("not") || op.op.eq_ignore_ascii_case("is not null") || op.op.eq_ignore_ascii_case("is null"),
            Expr::BetweenOperation(_) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier(n) => write!(f, "{n}"),
            Expr::Constant(n) => write!(f, "{n}"),
            Expr::Star(n) => write!(f, "{n}"),
            Expr::Parameter(n) => write!(f, "{n}"),
            Expr::Variable(n) => write!(f, "{n}"),
            Expr::Latest(n) => write!(f, "{n}"),
            Expr::Tuple(n) => write!(f, "{n}"),
            Expr::TypeCast(n) => write!(f, "{n}"),
            Expr::BinaryOperation(n) => write!(f, "{n}"),
            Expr::UnaryOperation(n) => write!(f, "{n}"),
            Expr::BetweenOperation(n) => write!(f, "{n}"),
            Expr::Function(n) => write!(f, "{n}"),
            Expr::Subquery(n) => write!(f, "{n}"),
        }
    }
}

fn quote_ident_part(part: &str) -> String {
    let needs_quoting = part.is_empty()
        || !part
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false)
        || !part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if needs_quoting {
        format!("`{}`", part.replace('`', "``"))
    } else {
        part.to_string()
    }
}

/// A (possibly multi-part, dotted) name: `a`, `a.b`, `` `a-b`.`c d` ``.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub parts: Vec<String>,
    /// Whether each segment was written with backticks in the source; used
    /// only to decide if re-rendering needs them too (a bare segment whose
    /// text happens to need quoting is re-quoted regardless).
    pub quoted_parts: Vec<bool>,
    pub alias: Option<String>,
}

impl Identifier {
    pub fn new(parts: impl IntoIterator<Item = impl Into<String>>) -> Identifier {
        let parts: Vec<String> = parts.into_iter().map(Into::into).collect();
        let quoted_parts = vec![false; parts.len()];
        Identifier { parts, quoted_parts, alias: None }
    }

    pub fn dotted(text: &str) -> Identifier {
        Identifier::new(text.split('.'))
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Identifier {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_quoted(mut self, quoted: Vec<bool>) -> Identifier {
        self.quoted_parts = quoted;
        self
    }

    pub fn to_tree(&self, level: usize) -> String {
        let ind = indent(level);
        let alias = self
            .alias
            .as_ref()
            .map(|a| format!(", alias={a}"))
            .unwrap_or_default();
        format!("{ind}Identifier(parts={:?}{alias})", self.parts)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .parts
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if self.quoted_parts.get(i).copied().unwrap_or(false) {
                    format!("`{}`", p.replace('`', "``"))
                } else {
                    quote_ident_part(p)
                }
            })
            .collect();
        write!(f, "{}", rendered.join("."))?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {}", quote_ident_part(alias))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Null,
}

/// A literal value. `NULL` is represented with `value: ConstantValue::Null`
/// but is frequently tested against as a distinct `NullConstant` shape, so
/// `Constant::null()` is provided as the canonical constructor for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub value: ConstantValue,
    /// Explicit: whatever the lexer emitted for a string literal. See
    /// `DESIGN.md` Open Question #2.
    pub with_quotes: bool,
    pub alias: Option<String>,
}

impl Constant {
    pub fn integer(v: i64) -> Constant {
        Constant { value: ConstantValue::Integer(v), with_quotes: false, alias: None }
    }

    pub fn float(v: f64) -> Constant {
        Constant { value: ConstantValue::Float(v), with_quotes: false, alias: None }
    }

    pub fn string(v: impl Into<String>) -> Constant {
        Constant { value: ConstantValue::String(v.into()), with_quotes: true, alias: None }
    }

    pub fn boolean(v: bool) -> Constant {
        Constant { value: ConstantValue::Boolean(v), with_quotes: false, alias: None }
    }

    pub fn null() -> Constant {
        Constant { value: ConstantValue::Null, with_quotes: false, alias: None }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Constant {
        self.alias = Some(alias.into());
        self
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.value {
            ConstantValue::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn to_tree(&self, level: usize) -> String {
        let ind = indent(level);
        match &self.value {
            ConstantValue::Null => format!("{ind}NullConstant()"),
            v => format!("{ind}Constant(value={v:?})"),
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            ConstantValue::Integer(v) => write!(f, "{v}")?,
            ConstantValue::Float(v) => write!(f, "{v}")?,
            ConstantValue::Boolean(v) => write!(f, "{}", if *v { "true" } else { "false" })?,
            ConstantValue::Null => write!(f, "NULL")?,
            ConstantValue::String(s) => {
                if self.with_quotes {
                    write!(f, "'{}'", s.replace('\'', "''"))?
                } else {
                    write!(f, "{s}")?
                }
            }
        }
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

/// `*`, illegal as a scalar operand (the parser rejects `1 + *`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Star;

impl Star {
    pub fn to_tree(&self, level: usize) -> String {
        format!("{}Star()", indent(level))
    }
}

impl fmt::Display for Star {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*")
    }
}

/// A bind parameter marker, e.g. `?`. Opaque to planning.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub value: String,
    pub alias: Option<String>,
}

impl Parameter {
    pub fn new(value: impl Into<String>) -> Parameter {
        Parameter { value: value.into(), alias: None }
    }

    pub fn to_tree(&self, level: usize) -> String {
        format!("{}Parameter(value={})", indent(level), self.value)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A MySQL/mindsdb `@name` or `@@name` variable reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub value: String,
    pub is_system_var: bool,
    pub alias: Option<String>,
}

impl Variable {
    pub fn new(value: impl Into<String>) -> Variable {
        Variable { value: value.into(), is_system_var: false, alias: None }
    }

    pub fn system(value: impl Into<String>) -> Variable {
        Variable { value: value.into(), is_system_var: true, alias: None }
    }

    pub fn to_tree(&self, level: usize) -> String {
        format!(
            "{}Variable(value={}, is_system_var={})",
            indent(level),
            self.value,
            self.is_system_var
        )
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_system_var {
            write!(f, "@@{}", self.value)
        } else {
            write!(f, "@{}", self.value)
        }
    }
}

/// The mindsdb `LATEST` temporal sentinel, meaningful only in time-series
/// predicate rewriting (`SPEC_FULL.md` §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Latest;

impl Latest {
    pub fn to_tree(&self, level: usize) -> String {
        format!("{}Latest()", indent(level))
    }
}

impl fmt::Display for Latest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LATEST")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    pub items: Vec<Expr>,
    pub alias: Option<String>,
}

impl Tuple {
    pub fn new(items: Vec<Expr>) -> Tuple {
        Tuple { items, alias: None }
    }

    pub fn to_tree(&self, level: usize) -> String {
        let ind = indent(level);
        let inner: Vec<String> = self.items.iter().map(|i| i.to_tree(level + 1)).collect();
        format!("{ind}Tuple(items=[\n{}\n{ind}])", inner.join(",\n"))
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.items.iter().map(|i| i.to_string()).collect();
        write!(f, "({})", rendered.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeCast {
    pub type_name: String,
    pub arg: Box<Expr>,
    pub alias: Option<String>,
}

impl TypeCast {
    pub fn new(type_name: impl Into<String>, arg: Expr) -> TypeCast {
        TypeCast { type_name: type_name.into(), arg: Box::new(arg), alias: None }
    }

    pub fn to_tree(&self, level: usize) -> String {
        let ind = indent(level);
        format!(
            "{ind}TypeCast(type_name={}, arg=\n{}\n{ind})",
            self.type_name,
            self.arg.to_tree(level + 1)
        )
    }
}

impl fmt::Display for TypeCast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CAST({} AS {})", self.arg, self.type_name)
    }
}

/// Binary operator symbol/keyword, lower-cased for keyword operators
/// (`and`, `or`, `like`, `in`, `is`, ...) and symbolic for the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinOp(pub String);

impl BinOp {
    pub fn new(op: impl Into<String>) -> BinOp {
        BinOp(op.into())
    }

    pub fn is_boolean(&self) -> bool {
        matches!(
            self.0.as_str(),
            "=" | "!=" | "<>" | "<" | "<=" | ">" | ">=" | "and" | "or" | "like" | "not like"
                | "ilike" | "not ilike" | "in" | "not in" | "is" | "is not"
        )
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for BinOp {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperation {
    pub op: BinOp,
    pub args: Box<(Expr, Expr)>,
    pub parentheses: bool,
    pub alias: Option<String>,
}

impl BinaryOperation {
    pub fn new(op: impl Into<String>, left: Expr, right: Expr) -> BinaryOperation {
        BinaryOperation {
            op: BinOp::new(op),
            args: Box::new((left, right)),
            parentheses: false,
            alias: None,
        }
    }

    pub fn with_parentheses(mut self) -> BinaryOperation {
        self.parentheses = true;
        self
    }

    pub fn to_tree(&self, level: usize) -> String {
        let ind = indent(level);
        format!(
            "{ind}BinaryOperation(op={}, args=[\n{},\n{}\n{ind}])",
            self.op,
            self.args.0.to_tree(level + 1),
            self.args.1.to_tree(level + 1)
        )
    }
}

impl fmt::Display for BinaryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword_op = self.op.chars().next().map(|c| c.is_ascii_alphabetic()).unwrap_or(false);
        let op_text = if keyword_op { format!(" {} ", self.op.0.to_uppercase()) } else { format!(" {} ", self.op) };
        let body = format!("{}{op_text}{}", self.args.0, self.args.1);
        if self.parentheses {
            write!(f, "({body})")?;
        } else {
            write!(f, "{body}")?;
        }
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperation {
    pub op: String,
    pub args: Box<Expr>,
    pub parentheses: bool,
    pub alias: Option<String>,
}

impl UnaryOperation {
    pub fn new(op: impl Into<String>, arg: Expr) -> UnaryOperation {
        UnaryOperation { op: op.into(), args: Box::new(arg), parentheses: false, alias: None }
    }

    pub fn to_tree(&self, level: usize) -> String {
        let ind = indent(level);
        format!(
            "{ind}UnaryOperation(op={}, args=[\n{}\n{ind}])",
            self.op,
            self.args.to_tree(level + 1)
        )
    }
}

impl fmt::Display for UnaryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.to_uppercase(), self.args)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BetweenOperation {
    pub args: Box<(Expr, Expr, Expr)>,
    pub alias: Option<String>,
}

impl BetweenOperation {
    pub fn new(expr: Expr, low: Expr, high: Expr) -> BetweenOperation {
        BetweenOperation { args: Box::new((expr, low, high)), alias: None }
    }

    pub fn expr(&self) -> &Expr {
        &self.args.0
    }

    pub fn low(&self) -> &Expr {
        &self.args.1
    }

    pub fn high(&self) -> &Expr {
        &self.args.2
    }

    pub fn to_tree(&self, level: usize) -> String {
        let ind = indent(level);
        format!(
            "{ind}BetweenOperation(args=[\n{},\n{},\n{}\n{ind}])",
            self.args.0.to_tree(level + 1),
            self.args.1.to_tree(level + 1),
            self.args.2.to_tree(level + 1)
        )
    }
}

impl fmt::Display for BetweenOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} BETWEEN {} AND {}", self.args.0, self.args.1, self.args.2)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub op: String,
    pub args: Vec<Expr>,
    pub distinct: bool,
    pub alias: Option<String>,
}

impl Function {
    pub fn new(op: impl Into<String>, args: Vec<Expr>) -> Function {
        Function { op: op.into(), args, distinct: false, alias: None }
    }

    pub fn distinct(mut self) -> Function {
        self.distinct = true;
        self
    }

    pub fn to_tree(&self, level: usize) -> String {
        let ind = indent(level);
        let inner: Vec<String> = self.args.iter().map(|a| a.to_tree(level + 1)).collect();
        format!(
            "{ind}Function(op={}, distinct={}, args=[\n{}\n{ind}])",
            self.op,
            self.distinct,
            inner.join(",\n")
        )
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
        let distinct = if self.distinct { "DISTINCT " } else { "" };
        write!(f, "{}({distinct}{})", self.op.to_uppercase(), args.join(", "))?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}
