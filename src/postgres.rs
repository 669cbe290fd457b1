//! [`ConnectionPool`] and [`Connection`] for SQLx's PostgreSQL pool.

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::pool::PoolConnection;
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgArgumentBuffer, PgArguments, PgRow, PgTypeInfo};
use sqlx::query::Query;
use sqlx::{Either, Encode, Executor, PgPool, Postgres, Type};

use crate::connection::{Connection, ConnectionPool, QueryOutput};
use crate::value::Value;

/// A connection checked out of a [`PgPool`].
///
/// Dropping or releasing it returns it to the pool.
pub struct PgPooledConnection {
    conn: PoolConnection<Postgres>,
}

impl PgPooledConnection {
    /// Returns the underlying SQLx connection for use as an `Executor`.
    pub fn as_executor(&mut self) -> &mut sqlx::PgConnection {
        &mut self.conn
    }
}

#[async_trait]
impl ConnectionPool for PgPool {
    type Connection = PgPooledConnection;

    async fn acquire(&self) -> crate::Result<PgPooledConnection> {
        let conn = PgPool::acquire(self).await?;
        Ok(PgPooledConnection { conn })
    }
}

#[async_trait]
impl Connection for PgPooledConnection {
    type Row = PgRow;

    async fn execute(&mut self, sql: &str, args: &[Value]) -> crate::Result<QueryOutput<PgRow>> {
        let query = args.iter().fold(sqlx::query(sql), bind_value);

        let mut output = QueryOutput::default();
        let mut results = self.as_executor().fetch_many(query);
        while let Some(step) = results.try_next().await? {
            match step {
                Either::Left(done) => output.row_count += done.rows_affected(),
                Either::Right(row) => output.rows.push(row),
            }
        }
        Ok(output)
    }

    fn discard(mut self) {
        // The server-side transaction state is unknown; don't hand this one out again.
        self.conn.close_on_drop();
    }
}

/// A NULL parameter declared with OID 0, so the server infers its type from
/// the surrounding expression instead of treating it as text.
struct UntypedNull;

impl Type<Postgres> for UntypedNull {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_oid(Oid(0))
    }
}

impl Encode<'_, Postgres> for UntypedNull {
    fn encode_by_ref(&self, _buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        Ok(IsNull::Yes)
    }
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &Value,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        Value::Null => query.bind(UntypedNull),
        Value::Bool(v) => query.bind(*v),
        Value::Int(v) => query.bind(*v),
        Value::Float(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.clone()),
        Value::Json(v) => query.bind(sqlx::types::Json(v.clone())),
    }
}
