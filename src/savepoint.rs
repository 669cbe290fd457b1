//! Savepoints inside an open transaction.
//!
//! Savepoint names cannot be bound as parameters, so they are inlined into the
//! statement and must match `[A-Za-z_][A-Za-z0-9_]*`.

use std::sync::LazyLock;

use futures::future::BoxFuture;
use regex::Regex;
use tracing::{debug, warn};

use crate::connection::Connection;
use crate::error::{Error, Result};

static SAVEPOINT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("savepoint name pattern is valid")
});

/// Checks that `name` can be inlined as a savepoint identifier.
pub fn validate_savepoint_name(name: &str) -> Result<()> {
    if SAVEPOINT_NAME.is_match(name) {
        Ok(())
    } else {
        Err(Error::validation("savepoint name must be a valid identifier"))
    }
}

/// Issues `SAVEPOINT <name>`.
pub async fn create_savepoint<C>(conn: &mut C, name: &str) -> Result<()>
where
    C: Connection + ?Sized,
{
    savepoint_statement(conn, "SAVEPOINT", name).await
}

/// Issues `ROLLBACK TO SAVEPOINT <name>`.
pub async fn rollback_to_savepoint<C>(conn: &mut C, name: &str) -> Result<()>
where
    C: Connection + ?Sized,
{
    savepoint_statement(conn, "ROLLBACK TO SAVEPOINT", name).await
}

/// Issues `RELEASE SAVEPOINT <name>`.
pub async fn release_savepoint<C>(conn: &mut C, name: &str) -> Result<()>
where
    C: Connection + ?Sized,
{
    savepoint_statement(conn, "RELEASE SAVEPOINT", name).await
}

async fn savepoint_statement<C>(conn: &mut C, command: &str, name: &str) -> Result<()>
where
    C: Connection + ?Sized,
{
    validate_savepoint_name(name)?;
    let sql = format!("{} {}", command, name);
    debug!(savepoint = name, statement = %sql, "savepoint");
    conn.execute(&sql, &[]).await?;
    Ok(())
}

/// Executes a nested unit of work under a savepoint.
///
/// On success the savepoint is released. On failure the work since the
/// savepoint is rolled back and the original error returned, leaving the
/// enclosing transaction usable.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::PgPool;
/// use sqlx_tx_query::{run_in_savepoint, run_in_transaction, Connection, TransactionOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = PgPool::connect("postgres://localhost/test").await?;
/// run_in_transaction(&pool, &TransactionOptions::default(), |tx| {
///     Box::pin(async move {
///         tx.execute("INSERT INTO users (name) VALUES ($1)", &["Alice".into()])
///             .await?;
///
///         // If this fails, only the audit row is rolled back
///         let _ = run_in_savepoint(tx, "audit", |sp| {
///             Box::pin(async move {
///                 sp.execute("INSERT INTO audit_log (action) VALUES ($1)", &["created".into()])
///                     .await?;
///                 Ok::<_, sqlx_tx_query::Error>(())
///             })
///         })
///         .await;
///
///         Ok::<_, sqlx_tx_query::Error>(())
///     })
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_in_savepoint<C, F, T, E>(conn: &mut C, name: &str, f: F) -> std::result::Result<T, E>
where
    C: Connection,
    F: for<'a> FnOnce(&'a mut C) -> BoxFuture<'a, std::result::Result<T, E>>,
    E: From<Error>,
{
    create_savepoint(conn, name).await?;

    match f(conn).await {
        Ok(result) => {
            release_savepoint(conn, name).await?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = rollback_to_savepoint(conn, name).await {
                warn!(savepoint = name, error = %rollback_err, "rollback to savepoint failed");
            }
            Err(e)
        }
    }
}
