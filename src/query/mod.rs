//! Query Builder - fluent SELECT builder producing parameterized statements
//!
//! Identifiers, operators and join expressions are inserted verbatim and must
//! come from trusted code. Values always travel through `$n` placeholders.

pub mod builder;
pub(crate) mod condition;
pub mod types;

pub use builder::QueryBuilder;
pub use types::{JoinKind, OrderDirection, Query};
