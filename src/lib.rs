//! # sqlx-tx-query
//!
//! Parameterized SQL building and transaction coordination for SQLx.
//!
//! ## Features
//!
//! - **Query Builder**: Fluent SELECT builder that emits `$n` placeholders and an ordered argument list; values are never interpolated into SQL text
//! - **Transaction Coordination**: Begin with isolation level, read-only mode and statement timeout; commit on success, roll back on error
//! - **Guaranteed Release**: The pooled connection is released exactly once on every exit path, including a failed rollback
//! - **Parallel Work**: Run several callbacks concurrently inside one transaction on one connection
//! - **Savepoints**: Validated savepoint names and a savepoint-scoped nested unit of work
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sqlx = { version = "0.8", features = ["postgres", "runtime-tokio"] }
//! sqlx-tx-query = "0.1"
//! ```
//!
//! ## Examples
//!
//! ### Building a Query
//!
//! ```
//! use sqlx_tx_query::{filters, QueryBuilder, Value};
//!
//! # fn main() -> sqlx_tx_query::Result<()> {
//! let query = QueryBuilder::new()
//!     .select(["id", "name"])?
//!     .from("users")?
//!     .where_eq(filters! { "tenant_id" => "t1", "active" => true })
//!     .where_in("role", ["admin", "owner"])
//!     .limit(20)?
//!     .build()?;
//!
//! assert_eq!(
//!     query.text,
//!     "SELECT id, name FROM users WHERE tenant_id = $1 AND active = $2 AND role IN ($3, $4) LIMIT $5"
//! );
//! assert_eq!(query.values.len(), 5);
//! # Ok(())
//! # }
//! ```
//!
//! ### Running a Transaction
//!
//! ```rust,no_run
//! use sqlx::PgPool;
//! use sqlx_tx_query::{
//!     filters, run_in_transaction, Connection, IsolationLevel, QueryBuilder, TransactionOptions,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgres://localhost/test").await?;
//!
//! let options = TransactionOptions::new()
//!     .isolation_level(IsolationLevel::RepeatableRead)
//!     .timeout_millis(5_000);
//!
//! let active = run_in_transaction(&pool, &options, |conn| {
//!     Box::pin(async move {
//!         let query = QueryBuilder::new()
//!             .select_count(None)
//!             .from("users")?
//!             .where_eq(filters! { "active" => true })
//!             .build()?;
//!         let out = conn.execute(&query.text, &query.values).await?;
//!         Ok::<_, sqlx_tx_query::Error>(out.rows.len())
//!     })
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Manual Transaction Control
//!
//! For more control, use `TransactionContext` directly:
//!
//! ```rust,no_run
//! use sqlx::PgPool;
//! use sqlx_tx_query::{create_savepoint, rollback_to_savepoint, Connection, TransactionContext, TransactionOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let pool = PgPool::connect("postgres://localhost/test").await?;
//! let mut tx = TransactionContext::begin(&pool, &TransactionOptions::default()).await?;
//! let conn = tx.connection()?;
//!
//! conn.execute("INSERT INTO users (name) VALUES ($1)", &["Eve".into()]).await?;
//! create_savepoint(conn, "before_profile").await?;
//! if conn.execute("INSERT INTO profiles (bio) VALUES ($1)", &["hi".into()]).await.is_err() {
//!     rollback_to_savepoint(conn, "before_profile").await?;
//! }
//!
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## How It Works
//!
//! 1. **QueryBuilder**: Stores conditions unnumbered and assigns placeholders at `build()`, so a session builds deterministically
//! 2. **TransactionContext**: Owns the checked-out connection and releases it from `Drop`
//! 3. **Executors**: `run_in_transaction` and friends decide commit or rollback from the callback's result
//! 4. **Connection traits**: Implemented for `sqlx::PgPool`; any other source of connections can implement them too
//!
//! ## Limitations
//!
//! - Column names, table names, operators and join expressions are inserted verbatim and must come from trusted code
//! - Parallel callbacks share one connection; their statements interleave in no guaranteed order
//! - No cancellation beyond the optional `statement_timeout`
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at your option.

pub mod config;
pub mod connection;
pub mod context;
pub mod error;
pub mod executor;
pub mod options;
pub mod postgres;
pub mod query;
pub mod savepoint;
pub mod value;

#[cfg(test)]
mod test_support;

pub use config::DatabaseConfig;
pub use connection::{Connection, ConnectionPool, QueryOutput, SharedConnection};
pub use context::{TransactionContext, TransactionState};
pub use error::{Error, Result};
pub use executor::{
    parallel_task, run_in_transaction, run_parallel_in_transaction, run_with_existing_connection,
    ParallelTask,
};
pub use options::{IsolationLevel, TransactionOptions};
pub use query::{JoinKind, OrderDirection, Query, QueryBuilder};
pub use savepoint::{
    create_savepoint, release_savepoint, rollback_to_savepoint, run_in_savepoint,
    validate_savepoint_name,
};
pub use value::{FilterValue, Value};

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::connection::{Connection, ConnectionPool};
    pub use crate::context::TransactionContext;
    pub use crate::error::{Error, Result};
    pub use crate::executor::{
        parallel_task, run_in_transaction, run_parallel_in_transaction,
        run_with_existing_connection,
    };
    pub use crate::filters;
    pub use crate::options::{IsolationLevel, TransactionOptions};
    pub use crate::query::{JoinKind, OrderDirection, QueryBuilder};
    pub use crate::savepoint::{create_savepoint, release_savepoint, rollback_to_savepoint, run_in_savepoint};
    pub use crate::value::{FilterValue, Value};
}
