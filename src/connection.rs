//! Connection and pool abstractions the transaction functions run against.
//!
//! [`postgres`](crate::postgres) implements these for `sqlx::PgPool`. Any other
//! driver, or a test double, only needs `acquire`, `execute` and `release`.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::value::Value;

/// Rows returned by a statement together with the affected-row count.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput<R> {
    pub rows: Vec<R>,
    pub row_count: u64,
}

impl<R> Default for QueryOutput<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            row_count: 0,
        }
    }
}

/// A connection that can run a statement with positional arguments.
#[async_trait]
pub trait Connection: Send {
    type Row: Send;

    /// Runs `sql`, binding `args` to `$1..$n` in order.
    async fn execute(&mut self, sql: &str, args: &[Value]) -> crate::Result<QueryOutput<Self::Row>>;

    /// Hands the connection back to wherever it came from.
    ///
    /// The default drops it, which is what returns an sqlx pool connection to its pool.
    fn release(self)
    where
        Self: Sized,
    {
    }

    /// Hands back a connection whose transaction state is unknown, e.g. after a
    /// failed `COMMIT` or `ROLLBACK`. Implementations should make sure it is not
    /// reused as-is. Defaults to [`release`](Self::release).
    fn discard(self)
    where
        Self: Sized,
    {
        self.release()
    }
}

/// A source of connections.
#[async_trait]
pub trait ConnectionPool: Send + Sync {
    type Connection: Connection;

    async fn acquire(&self) -> crate::Result<Self::Connection>;
}

/// A connection shared by concurrently running callbacks.
///
/// Each `execute` holds the lock for one statement, so statements from
/// different holders may interleave in any order.
pub struct SharedConnection<'a, C> {
    inner: &'a Mutex<C>,
}

impl<'a, C> SharedConnection<'a, C> {
    pub(crate) fn new(inner: &'a Mutex<C>) -> Self {
        Self { inner }
    }
}

impl<C> Clone for SharedConnection<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for SharedConnection<'_, C> {}

#[async_trait]
impl<'a, C: Connection> Connection for SharedConnection<'a, C> {
    type Row = C::Row;

    async fn execute(&mut self, sql: &str, args: &[Value]) -> crate::Result<QueryOutput<Self::Row>> {
        self.inner.lock().await.execute(sql, args).await
    }
}
