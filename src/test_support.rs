//! In-memory pool that records every statement, for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::connection::{Connection, ConnectionPool, QueryOutput};
use crate::error::{Error, Result};
use crate::value::Value;

#[derive(Default)]
struct Inner {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    failing: Mutex<Vec<String>>,
    fail_acquire: AtomicBool,
    acquires: AtomicUsize,
    releases: AtomicUsize,
    discards: AtomicUsize,
}

#[derive(Clone, Default)]
pub(crate) struct RecordingPool {
    inner: Arc<Inner>,
}

impl RecordingPool {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Statements starting with `prefix` fail with a database error.
    pub(crate) fn fail_on(self, prefix: &str) -> Self {
        self.inner.failing.lock().unwrap().push(prefix.to_owned());
        self
    }

    pub(crate) fn fail_acquire(self) -> Self {
        self.inner.fail_acquire.store(true, Ordering::SeqCst);
        self
    }

    pub(crate) fn connection(&self) -> RecordingConnection {
        RecordingConnection {
            inner: Arc::clone(&self.inner),
        }
    }

    pub(crate) fn statements(&self) -> Vec<String> {
        self.calls().into_iter().map(|(sql, _)| sql).collect()
    }

    pub(crate) fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, statement: &str) -> usize {
        self.statements().iter().filter(|s| *s == statement).count()
    }

    pub(crate) fn acquires(&self) -> usize {
        self.inner.acquires.load(Ordering::SeqCst)
    }

    pub(crate) fn releases(&self) -> usize {
        self.inner.releases.load(Ordering::SeqCst)
    }

    pub(crate) fn discards(&self) -> usize {
        self.inner.discards.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConnectionPool for RecordingPool {
    type Connection = RecordingConnection;

    async fn acquire(&self) -> Result<RecordingConnection> {
        if self.inner.fail_acquire.load(Ordering::SeqCst) {
            return Err(Error::Database(sqlx::Error::PoolTimedOut));
        }
        self.inner.acquires.fetch_add(1, Ordering::SeqCst);
        Ok(self.connection())
    }
}

pub(crate) struct RecordingConnection {
    inner: Arc<Inner>,
}

#[async_trait]
impl Connection for RecordingConnection {
    type Row = Vec<Value>;

    async fn execute(&mut self, sql: &str, args: &[Value]) -> Result<QueryOutput<Vec<Value>>> {
        self.inner
            .calls
            .lock()
            .unwrap()
            .push((sql.to_owned(), args.to_vec()));

        let fails = self
            .inner
            .failing
            .lock()
            .unwrap()
            .iter()
            .any(|prefix| sql.starts_with(prefix.as_str()));
        if fails {
            return Err(Error::Database(sqlx::Error::Protocol(format!(
                "injected failure: {}",
                sql
            ))));
        }

        Ok(QueryOutput {
            rows: vec![args.to_vec()],
            row_count: 1,
        })
    }

    fn release(self) {
        self.inner.releases.fetch_add(1, Ordering::SeqCst);
    }

    fn discard(self) {
        self.inner.discards.fetch_add(1, Ordering::SeqCst);
        self.release();
    }
}
