// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Dialect keyword tables.
//!
//! Each dialect gets a sorted `(name, Keyword)` array searched with
//! `binary_search_by_key`, the same shape as `RisingwaveLabs-risingwave`'s
//! `sqlparser/src/keywords.rs` keyword-array pattern, built once via
//! `once_cell::sync::Lazy` and read-only thereafter (`SPEC_FULL.md` §2A.3).

use once_cell::sync::Lazy;

use mindsdb_sql_ast::Dialect;

macro_rules! define_keywords {
    ($($variant:ident => $text:expr),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Keyword {
            $($variant,)*
        }

        impl Keyword {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Keyword::$variant => $text,)*
                }
            }
        }
    };
}

define_keywords! {
    Select => "SELECT",
    Distinct => "DISTINCT",
    From => "FROM",
    Where => "WHERE",
    Group => "GROUP",
    By => "BY",
    Having => "HAVING",
    Order => "ORDER",
    Asc => "ASC",
    Desc => "DESC",
    Nulls => "NULLS",
    First => "FIRST",
    Last => "LAST",
    Limit => "LIMIT",
    Offset => "OFFSET",
    As => "AS",
    Join => "JOIN",
    Inner => "INNER",
    Left => "LEFT",
    Right => "RIGHT",
    Full => "FULL",
    On => "ON",
    And => "AND",
    Or => "OR",
    Not => "NOT",
    Is => "IS",
    In => "IN",
    Like => "LIKE",
    Ilike => "ILIKE",
    Between => "BETWEEN",
    Null => "NULL",
    True => "TRUE",
    False => "FALSE",
    Cast => "CAST",
    Union => "UNION",
    All => "ALL",
    Set => "SET",
    Names => "NAMES",
    Start => "START",
    Transaction => "TRANSACTION",
    Commit => "COMMIT",
    Rollback => "ROLLBACK",
    Explain => "EXPLAIN",
    Alter => "ALTER",
    Table => "TABLE",
    Disable => "DISABLE",
    Enable => "ENABLE",
    Keys => "KEYS",
    // mindsdb-only extensions
    Latest => "LATEST",
    Predictor => "PREDICTOR",
    Predict => "PREDICT",
    Using => "USING",
    Retrain => "RETRAIN",
    Window => "WINDOW",
    Use => "USE",
    Create => "CREATE",
    Replace => "REPLACE",
    Drop => "DROP",
}

const MINDSDB_ONLY: &[Keyword] = &[
    Keyword::Latest,
    Keyword::Predictor,
    Keyword::Predict,
    Keyword::Using,
    Keyword::Retrain,
    Keyword::Window,
    Keyword::Use,
    Keyword::Create,
    Keyword::Replace,
    Keyword::Drop,
];

fn base_entries() -> Vec<(&'static str, Keyword)> {
    use Keyword::*;
    let all = [
        Select, Distinct, From, Where, Group, By, Having, Order, Asc, Desc, Nulls, First, Last,
        Limit, Offset, As, Join, Inner, Left, Right, Full, On, And, Or, Not, Is, In, Like, Ilike,
        Between, Null, True, False, Cast, Union, All, Set, Names, Start, Transaction, Commit,
        Rollback, Explain, Alter, Table, Disable, Enable, Keys, Latest, Predictor, Predict, Using,
        Retrain, Window, Use, Create, Replace, Drop,
    ];
    all.into_iter()
        .filter(|kw| !MINDSDB_ONLY.contains(kw))
        .map(|kw| (kw.as_str(), kw))
        .collect()
}

fn sorted(mut entries: Vec<(&'static str, Keyword)>) -> Vec<(&'static str, Keyword)> {
    entries.sort_by_key(|(name, _)| *name);
    entries
}

static SQLITE_KEYWORDS: Lazy<Vec<(&'static str, Keyword)>> = Lazy::new(|| sorted(base_entries()));

static MYSQL_KEYWORDS: Lazy<Vec<(&'static str, Keyword)>> = Lazy::new(|| sorted(base_entries()));

static MINDSDB_KEYWORDS: Lazy<Vec<(&'static str, Keyword)>> = Lazy::new(|| {
    let mut entries = base_entries();
    entries.extend(MINDSDB_ONLY.iter().map(|kw| (kw.as_str(), *kw)));
    sorted(entries)
});

/// Binary-search the keyword table for `dialect`; `None` means `word` is a
/// plain identifier in this dialect.
pub fn lookup(dialect: Dialect, word: &str) -> Option<Keyword> {
    let upper = word.to_ascii_uppercase();
    let table: &Vec<(&'static str, Keyword)> = match dialect {
        Dialect::Sqlite => &SQLITE_KEYWORDS,
        Dialect::MySql => &MYSQL_KEYWORDS,
        Dialect::MindsDb => &MINDSDB_KEYWORDS,
    };
    table
        .binary_search_by_key(&upper.as_str(), |(name, _)| *name)
        .ok()
        .map(|idx| table[idx].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_has_no_predictor_keywords() {
        assert_eq!(lookup(Dialect::Sqlite, "PREDICTOR"), None);
        assert_eq!(lookup(Dialect::Sqlite, "select"), Some(Keyword::Select));
    }

    #[test]
    fn mindsdb_recognizes_latest() {
        assert_eq!(lookup(Dialect::MindsDb, "latest"), Some(Keyword::Latest));
        assert_eq!(lookup(Dialect::MySql, "latest"), None);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup(Dialect::MySql, "SeLeCt"), Some(Keyword::Select));
    }
}
