//! Query builder types: join kinds, ordering, and the built statement.

use std::fmt;

use crate::value::Value;

/// Join types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Full => "FULL",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Join clause. Every field is inserted into the statement verbatim.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct JoinClause {
    pub kind: String,
    pub table: String,
    pub on: String,
}

/// Order by direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// What the SELECT list renders as.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) enum Selection {
    #[default]
    Unset,
    Columns(Vec<String>),
    Count(String),
}

/// A built statement: SQL text with `$n` placeholders and the arguments that
/// bind to them, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub text: String,
    pub values: Vec<Value>,
}

impl Query {
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.text, self.values)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
