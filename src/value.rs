//! Bound argument values.
//!
//! [`Value`] is the element type of every argument list this crate produces or
//! sends to a [`Connection`](crate::Connection). [`FilterValue`] is the input side
//! of mapping-style conditions, where a column may be skipped, tested for NULL,
//! compared to one value or matched against a list.

/// A single positional argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! impl_int_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_int_value!(i8, i16, i32, i64, u8, u16, u32);

// Unsigned values past `i64::MAX` have no BIGINT form. They are sent as their
// decimal text so the server rejects them rather than receiving a clamped number.
macro_rules! impl_wide_unsigned_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    i64::try_from(v).map_or_else(|_| Value::Text(v.to_string()), Value::Int)
                }
            }
        )*
    };
}

impl_wide_unsigned_value!(u64, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

/// `None` becomes [`Value::Null`].
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// The value side of one `column => value` entry in a condition mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Not provided: the entry produces no clause and no argument.
    Absent,
    /// `column IS NULL`
    Null,
    /// `column = $n`
    One(Value),
    /// `column IN ($n, ...)`, or the always-false sentinel when empty
    Many(Vec<Value>),
}

impl From<Value> for FilterValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => FilterValue::Null,
            other => FilterValue::One(other),
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        FilterValue::Many(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FilterValue::Absent, Into::into)
    }
}

macro_rules! impl_scalar_filter {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FilterValue {
                fn from(v: $t) -> Self {
                    FilterValue::One(Value::from(v))
                }
            }
        )*
    };
}

impl_scalar_filter!(
    bool, i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64, &str, String, &String
);

impl From<serde_json::Value> for FilterValue {
    fn from(v: serde_json::Value) -> Self {
        FilterValue::One(Value::Json(v))
    }
}

/// Builds an ordered `column => value` mapping for
/// [`QueryBuilder::where_eq`](crate::QueryBuilder::where_eq) and
/// [`QueryBuilder::having`](crate::QueryBuilder::having).
///
/// Values of different types may be mixed; each is converted with
/// `FilterValue::from`.
///
/// ```
/// use sqlx_tx_query::{filters, FilterValue};
///
/// let status: Option<&str> = None;
/// let f = filters! { "tenant_id" => "t1", "active" => true, "status" => status };
/// assert_eq!(f.len(), 3);
/// assert_eq!(f[2].1, FilterValue::Absent);
/// ```
#[macro_export]
macro_rules! filters {
    () => {
        ::std::vec::Vec::<(::std::string::String, $crate::FilterValue)>::new()
    };
    ($($column:expr => $value:expr),+ $(,)?) => {
        ::std::vec![
            $((::std::string::String::from($column), $crate::FilterValue::from($value))),+
        ]
    };
}
