//! Transaction options: isolation level, read-only mode and statement timeout.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Transaction isolation levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub fn as_sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for IsolationLevel {
    type Err = Error;

    /// Accepts the SQL spelling in any case, with spaces or underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('_', " ");
        match normalized.as_str() {
            "READ UNCOMMITTED" => Ok(IsolationLevel::ReadUncommitted),
            "READ COMMITTED" => Ok(IsolationLevel::ReadCommitted),
            "REPEATABLE READ" => Ok(IsolationLevel::RepeatableRead),
            "SERIALIZABLE" => Ok(IsolationLevel::Serializable),
            _ => Err(Error::validation(format!("unknown isolation level '{}'", s))),
        }
    }
}

/// Options applied when a transaction begins.
///
/// ```
/// use sqlx_tx_query::{IsolationLevel, TransactionOptions};
///
/// let options = TransactionOptions::new()
///     .isolation_level(IsolationLevel::Serializable)
///     .read_only(true)
///     .timeout_millis(5_000);
///
/// assert_eq!(options.begin_statement(), "BEGIN ISOLATION LEVEL SERIALIZABLE READ ONLY");
/// assert_eq!(
///     options.timeout_statement().as_deref(),
///     Some("SET LOCAL statement_timeout = 5000")
/// );
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionOptions {
    /// Isolation level for `BEGIN`; the server default when `None`.
    pub isolation_level: Option<IsolationLevel>,
    /// Adds `READ ONLY` to `BEGIN`.
    pub read_only: bool,
    /// Per-statement timeout in milliseconds for the life of the transaction.
    pub timeout_millis: Option<u64>,
}

impl TransactionOptions {
    /// Options for a plain read-write `BEGIN` with no timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the isolation level.
    pub fn isolation_level(mut self, level: IsolationLevel) -> Self {
        self.isolation_level = Some(level);
        self
    }

    /// Marks the transaction `READ ONLY`.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets the statement timeout, applied with `SET LOCAL` right after `BEGIN`.
    pub fn timeout_millis(mut self, millis: u64) -> Self {
        self.timeout_millis = Some(millis);
        self
    }

    /// The `BEGIN` statement these options describe.
    pub fn begin_statement(&self) -> String {
        let mut sql = String::from("BEGIN");
        if let Some(level) = self.isolation_level {
            sql.push_str(" ISOLATION LEVEL ");
            sql.push_str(level.as_sql());
        }
        if self.read_only {
            sql.push_str(" READ ONLY");
        }
        sql
    }

    /// `SET LOCAL statement_timeout`, scoped to the transaction, if a timeout is set.
    pub fn timeout_statement(&self) -> Option<String> {
        self.timeout_millis
            .map(|millis| format!("SET LOCAL statement_timeout = {}", millis))
    }
}
