//! Condition clauses for WHERE and HAVING.
//!
//! Conditions are stored unnumbered. Placeholder indices are assigned only when
//! a statement is rendered, so building the same session twice yields the same
//! text and arguments.

use crate::value::{FilterValue, Value};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Condition {
    Equals { column: String, value: Value },
    In { column: String, values: Vec<Value> },
    IsNull(String),
    IsNotNull(String),
    Op { column: String, operator: String, value: Value },
}

impl Condition {
    /// Converts one mapping entry. Returns `None` for absent values.
    pub(crate) fn from_filter(column: String, value: FilterValue) -> Option<Self> {
        match value {
            FilterValue::Absent => None,
            FilterValue::Null | FilterValue::One(Value::Null) => Some(Condition::IsNull(column)),
            FilterValue::One(value) => Some(Condition::Equals { column, value }),
            FilterValue::Many(values) => Some(Condition::In { column, values }),
        }
    }

    pub(crate) fn render(&self, args: &mut Arguments) -> String {
        match self {
            Condition::Equals { column, value } => {
                format!("{} = {}", column, args.push(value.clone()))
            }
            Condition::In { values, .. } if values.is_empty() => {
                // `IN ()` is rejected by several dialects; bind a sentinel that never matches.
                format!("1 = {}", args.push(Value::Int(0)))
            }
            Condition::In { column, values } => {
                let placeholders: Vec<String> =
                    values.iter().map(|v| args.push(v.clone())).collect();
                format!("{} IN ({})", column, placeholders.join(", "))
            }
            Condition::IsNull(column) => format!("{} IS NULL", column),
            Condition::IsNotNull(column) => format!("{} IS NOT NULL", column),
            Condition::Op {
                column,
                operator,
                value,
            } => format!("{} {} {}", column, operator, args.push(value.clone())),
        }
    }
}

/// Ordered argument list that hands out consecutive `$n` placeholders.
#[derive(Debug, Default)]
pub(crate) struct Arguments {
    values: Vec<Value>,
}

impl Arguments {
    pub(crate) fn push(&mut self, value: Value) -> String {
        self.values.push(value);
        format!("${}", self.values.len())
    }

    pub(crate) fn into_values(self) -> Vec<Value> {
        self.values
    }
}

pub(crate) fn render_all(conditions: &[Condition], args: &mut Arguments) -> String {
    conditions
        .iter()
        .map(|c| c.render(args))
        .collect::<Vec<_>>()
        .join(" AND ")
}
