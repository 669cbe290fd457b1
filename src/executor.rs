use futures::future::{join_all, BoxFuture};
use tracing::warn;

use crate::connection::{Connection, ConnectionPool, SharedConnection};
use crate::context::TransactionContext;
use crate::error::Error;
use crate::options::TransactionOptions;

/// A boxed callback for [`run_parallel_in_transaction`].
///
/// Build one with [`parallel_task`] so the closure gets the right signature.
pub type ParallelTask<'c, C, T, E> =
    Box<dyn for<'a> FnOnce(SharedConnection<'a, C>) -> BoxFuture<'a, Result<T, E>> + Send + 'c>;

/// Boxes a closure as a [`ParallelTask`].
pub fn parallel_task<'c, C, T, E, F>(f: F) -> ParallelTask<'c, C, T, E>
where
    F: for<'a> FnOnce(SharedConnection<'a, C>) -> BoxFuture<'a, Result<T, E>> + Send + 'c,
{
    Box::new(f)
}

/// Executes a function within a database transaction.
///
/// This function handles the transaction lifecycle automatically:
/// - Acquires a connection from `pool`
/// - Begins a transaction according to `options`
/// - Executes the provided function exactly once
/// - Commits on success, rolls back on error
/// - Releases the connection on every path
///
/// If the rollback itself fails, that failure is logged and the function's
/// original error is returned.
///
/// The callback may use any error type that a crate [`Error`] converts into,
/// such as `sqlx_tx_query::Error` itself or `anyhow::Error`.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::PgPool;
/// use sqlx_tx_query::{run_in_transaction, Connection, TransactionOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = PgPool::connect("postgres://localhost/test").await?;
/// let inserted = run_in_transaction(&pool, &TransactionOptions::default(), |conn| {
///     Box::pin(async move {
///         let out = conn
///             .execute("INSERT INTO users (name) VALUES ($1)", &["Alice".into()])
///             .await?;
///         Ok::<_, sqlx_tx_query::Error>(out.row_count)
///     })
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_in_transaction<P, F, T, E>(
    pool: &P,
    options: &TransactionOptions,
    f: F,
) -> Result<T, E>
where
    P: ConnectionPool,
    F: for<'a> FnOnce(&'a mut P::Connection) -> BoxFuture<'a, Result<T, E>>,
    E: From<Error>,
{
    let mut tx = TransactionContext::begin(pool, options).await?;

    match f(tx.connection()?).await {
        Ok(result) => {
            tx.commit().await?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback failed; returning the original error");
            }
            Err(e)
        }
    }
}

/// Runs `f` on a connection whose transaction the caller already manages.
///
/// Nothing is begun, committed, rolled back, acquired or released. Errors from
/// `f` are returned unchanged. Use this from helpers that must join an outer
/// transaction instead of starting their own.
pub async fn run_with_existing_connection<C, F, T, E>(conn: &mut C, f: F) -> Result<T, E>
where
    C: Connection,
    F: for<'a> FnOnce(&'a mut C) -> BoxFuture<'a, Result<T, E>>,
{
    f(conn).await
}

/// Runs every task concurrently inside one transaction on one connection.
///
/// Waits for all tasks. If every task succeeds the transaction commits and the
/// results are returned in task order. Otherwise the transaction rolls back
/// once and the error of the first failing task (in task order) is returned.
///
/// Tasks share the connection through [`SharedConnection`]; their statements
/// interleave in no particular order and see each other's uncommitted writes
/// as the database's read-your-own-writes rules allow.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::PgPool;
/// use sqlx_tx_query::postgres::PgPooledConnection;
/// use sqlx_tx_query::{
///     parallel_task, run_parallel_in_transaction, Connection, Error, ParallelTask, TransactionOptions,
/// };
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = PgPool::connect("postgres://localhost/test").await?;
/// let sessions: ParallelTask<'_, PgPooledConnection, u64, Error> = parallel_task(|mut conn| {
///     Box::pin(async move {
///         let out = conn.execute("DELETE FROM sessions WHERE user_id = $1", &[7.into()]).await?;
///         Ok(out.row_count)
///     })
/// });
/// let tokens: ParallelTask<'_, PgPooledConnection, u64, Error> = parallel_task(|mut conn| {
///     Box::pin(async move {
///         let out = conn.execute("DELETE FROM tokens WHERE user_id = $1", &[7.into()]).await?;
///         Ok(out.row_count)
///     })
/// });
///
/// let counts =
///     run_parallel_in_transaction(&pool, &TransactionOptions::default(), vec![sessions, tokens])
///         .await?;
/// assert_eq!(counts.len(), 2);
/// # Ok(())
/// # }
/// ```
pub async fn run_parallel_in_transaction<P, I, F, T, E>(
    pool: &P,
    options: &TransactionOptions,
    tasks: I,
) -> Result<Vec<T>, E>
where
    P: ConnectionPool,
    I: IntoIterator<Item = F>,
    F: for<'a> FnOnce(SharedConnection<'a, P::Connection>) -> BoxFuture<'a, Result<T, E>>,
    E: From<Error>,
{
    let tx = TransactionContext::begin(pool, options).await?;

    let outcomes = {
        let shared = tx.shared()?;
        join_all(tasks.into_iter().map(|task| task(shared))).await
    };

    let mut results = Vec::with_capacity(outcomes.len());
    let mut failure = None;
    for outcome in outcomes {
        match outcome {
            Ok(value) => results.push(value),
            Err(e) => {
                failure.get_or_insert(e);
            }
        }
    }

    match failure {
        None => {
            tx.commit().await?;
            Ok(results)
        }
        Some(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback failed; returning the original error");
            }
            Err(e)
        }
    }
}
