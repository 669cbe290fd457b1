use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::connection::{Connection, ConnectionPool, SharedConnection};
use crate::error::{Error, Result};
use crate::options::TransactionOptions;

/// Lifecycle of one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Acquiring,
    Active,
    Committing,
    Aborting,
    Done,
}

/// Transaction context owning one pooled connection for the length of a transaction.
///
/// The connection is released exactly once, when the context is dropped. A
/// context that is dropped while the transaction is still open, or after a
/// control statement failed, hands the connection back through
/// [`Connection::discard`] instead of [`Connection::release`].
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::PgPool;
/// use sqlx_tx_query::{Connection, TransactionContext, TransactionOptions};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = PgPool::connect("postgres://localhost/test").await?;
/// let mut tx = TransactionContext::begin(&pool, &TransactionOptions::default()).await?;
///
/// tx.connection()?
///     .execute("INSERT INTO users (name) VALUES ($1)", &["Alice".into()])
///     .await?;
///
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```
pub struct TransactionContext<C: Connection> {
    conn: Option<Mutex<C>>,
    state: TransactionState,
    poisoned: bool,
}

impl<C: Connection> TransactionContext<C> {
    /// Acquires a connection from `pool` and begins a transaction on it.
    ///
    /// # Errors
    ///
    /// Returns an error if acquiring the connection, `BEGIN`, or the
    /// statement-timeout setup fails. The connection is released either way.
    pub async fn begin<P>(pool: &P, options: &TransactionOptions) -> Result<Self>
    where
        P: ConnectionPool<Connection = C>,
    {
        trace!(state = ?TransactionState::Acquiring, "acquiring connection");
        let conn = pool.acquire().await?;
        let mut ctx = Self {
            conn: Some(Mutex::new(conn)),
            state: TransactionState::Acquiring,
            poisoned: false,
        };

        let begin = options.begin_statement();
        debug!(statement = %begin, "beginning transaction");
        if let Err(e) = ctx.control(&begin).await {
            ctx.poisoned = true;
            ctx.transition(TransactionState::Done);
            return Err(e);
        }
        ctx.transition(TransactionState::Active);

        if let Some(timeout) = options.timeout_statement() {
            if let Err(e) = ctx.control(&timeout).await {
                if let Err(rollback_err) = ctx.finish("ROLLBACK", TransactionState::Aborting).await {
                    warn!(error = %rollback_err, "rollback failed after statement timeout setup error");
                }
                return Err(e);
            }
        }

        Ok(ctx)
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if `COMMIT` fails. The connection is still released.
    pub async fn commit(mut self) -> Result<()> {
        debug!("committing transaction");
        self.finish("COMMIT", TransactionState::Committing).await
    }

    /// Rolls back the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if `ROLLBACK` fails. The connection is still released.
    pub async fn rollback(mut self) -> Result<()> {
        debug!("rolling back transaction");
        self.finish("ROLLBACK", TransactionState::Aborting).await
    }

    /// Returns the connection the transaction runs on.
    pub fn connection(&mut self) -> Result<&mut C> {
        self.conn
            .as_mut()
            .map(Mutex::get_mut)
            .ok_or(Error::AlreadyConsumed)
    }

    /// Returns a handle that several tasks can execute through concurrently.
    pub fn shared(&self) -> Result<SharedConnection<'_, C>> {
        self.conn
            .as_ref()
            .map(SharedConnection::new)
            .ok_or(Error::AlreadyConsumed)
    }

    /// Current lifecycle state. `Active` from a successful `begin` until `commit` or `rollback`.
    pub fn state(&self) -> TransactionState {
        self.state
    }

    async fn finish(&mut self, statement: &str, via: TransactionState) -> Result<()> {
        self.transition(via);
        let result = self.control(statement).await;
        if result.is_err() {
            self.poisoned = true;
        }
        self.transition(TransactionState::Done);
        result
    }

    async fn control(&mut self, statement: &str) -> Result<()> {
        self.connection()?.execute(statement, &[]).await?;
        Ok(())
    }

    fn transition(&mut self, next: TransactionState) {
        trace!(from = ?self.state, to = ?next, "transaction state");
        self.state = next;
    }
}

impl<C: Connection> Drop for TransactionContext<C> {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        let conn = conn.into_inner();
        if self.state == TransactionState::Done && !self.poisoned {
            conn.release();
        } else {
            if self.state != TransactionState::Done {
                warn!(state = ?self.state, "transaction context dropped while open");
            }
            conn.discard();
        }
        self.state = TransactionState::Done;
    }
}
