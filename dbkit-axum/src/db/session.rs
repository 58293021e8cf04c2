//! Request-scoped database sessions
//!
//! A [`DbSession`] owns one pooled connection. Clones share it, and the
//! connection returns to the pool when the last clone drops.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tokio::sync::{Mutex, MutexGuard};

use super::Record;
use crate::error::Result;

/// Cloneable handle to a single pooled connection.
///
/// Statements issued through one session run one at a time, in order.
#[derive(Clone)]
pub struct DbSession {
    conn: Arc<Mutex<PoolConnection<Sqlite>>>,
}

impl DbSession {
    /// Check a connection out of `pool`.
    pub async fn acquire(pool: &SqlitePool) -> Result<Self> {
        let conn = pool.acquire().await?;
        Ok(Self::from_connection(conn))
    }

    pub fn from_connection(conn: PoolConnection<Sqlite>) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Lock the connection for raw `sqlx` use.
    ///
    /// ```ignore
    /// let mut conn = session.connection().await;
    /// sqlx::query("DELETE FROM users").execute(&mut **conn).await?;
    /// ```
    pub async fn connection(&self) -> MutexGuard<'_, PoolConnection<Sqlite>> {
        self.conn.lock().await
    }

    pub(crate) async fn fetch_all<T: Record>(
        &self,
        qb: &mut QueryBuilder<'static, Sqlite>,
    ) -> Result<Vec<T>> {
        tracing::debug!(sql = qb.sql(), "fetch");
        let mut conn = self.conn.lock().await;
        let rows = qb.build_query_as::<T>().fetch_all(&mut **conn).await?;
        Ok(rows)
    }

    pub(crate) async fn fetch_i64(&self, qb: &mut QueryBuilder<'static, Sqlite>) -> Result<i64> {
        tracing::debug!(sql = qb.sql(), "fetch scalar");
        let mut conn = self.conn.lock().await;
        let value = qb.build_query_scalar::<i64>().fetch_one(&mut **conn).await?;
        Ok(value)
    }
}

impl fmt::Debug for DbSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSession")
            .field("handles", &Arc::strong_count(&self.conn))
            .finish()
    }
}

/// Produces a fresh session per unit of work (usually per request).
#[async_trait]
pub trait SessionFactory: Clone + Send + Sync + 'static {
    async fn session(&self) -> Result<DbSession>;
}

#[async_trait]
impl SessionFactory for SqlitePool {
    async fn session(&self) -> Result<DbSession> {
        DbSession::acquire(self).await
    }
}
