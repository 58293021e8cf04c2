//! Execution helpers over a [`Select`]
//!
//! ```ignore
//! let users: Collection<User> = query(&session).all(Select::from_table("users")).await?;
//! ```

use dbkit_core::Collection;
use futures::stream::{self, Stream, TryStreamExt};

use crate::db::{DbSession, Record, Select};
use crate::error::{DbError, Result};

/// Run statements against one session.
pub fn query(session: &DbSession) -> Query<'_> {
    Query { session }
}

#[derive(Debug, Clone, Copy)]
pub struct Query<'s> {
    session: &'s DbSession,
}

struct Cursor {
    offset: u64,
    remaining: Option<u64>,
    exhausted: bool,
}

impl<'s> Query<'s> {
    pub fn session(&self) -> &'s DbSession {
        self.session
    }

    /// Exactly one row.
    ///
    /// # Errors
    ///
    /// [`DbError::NoResult`] when nothing matches,
    /// [`DbError::MultipleResults`] when more than one row does.
    pub async fn one<T: Record>(&self, stmt: Select) -> Result<T> {
        self.one_or_none(stmt).await?.ok_or(DbError::NoResult)
    }

    /// Zero or one row; more than one is an error.
    pub async fn one_or_none<T: Record>(&self, stmt: Select) -> Result<Option<T>> {
        let mut qb = stmt.limit_at_most(2).build();
        let mut rows: Vec<T> = self.session.fetch_all(&mut qb).await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            _ => Err(DbError::MultipleResults),
        }
    }

    pub async fn one_or_default<T: Record>(&self, stmt: Select, default: T) -> Result<T> {
        Ok(self.one_or_none(stmt).await?.unwrap_or(default))
    }

    pub async fn all<T: Record>(&self, stmt: Select) -> Result<Collection<T>> {
        let mut qb = stmt.build();
        let rows: Vec<T> = self.session.fetch_all(&mut qb).await?;
        Ok(Collection::new(rows))
    }

    /// Stream rows, fetching `batch_size` at a time.
    ///
    /// The statement's own limit and offset bound the whole stream. Batches
    /// are fetched by offset, so give the statement an ordering when the
    /// table may change underneath.
    pub fn iterator<T>(&self, stmt: Select, batch_size: u64) -> impl Stream<Item = Result<T>> + 's
    where
        T: Record + 's,
    {
        let session = self.session;
        let batch_size = batch_size.max(1);
        let start = Cursor {
            offset: stmt.offset_value().unwrap_or(0),
            remaining: stmt.limit_value(),
            exhausted: false,
        };

        stream::try_unfold(start, move |cursor| {
            let stmt = stmt.clone();
            async move {
                let take = cursor.remaining.map_or(batch_size, |r| r.min(batch_size));
                if cursor.exhausted || take == 0 {
                    return Ok(None);
                }

                let mut qb = stmt.limit(take).offset(cursor.offset).build();
                let rows: Vec<T> = session.fetch_all(&mut qb).await?;
                if rows.is_empty() {
                    return Ok(None);
                }

                let fetched = rows.len() as u64;
                let next = Cursor {
                    offset: cursor.offset + fetched,
                    remaining: cursor.remaining.map(|r| r.saturating_sub(fetched)),
                    exhausted: fetched < take,
                };
                Ok::<_, DbError>(Some((rows, next)))
            }
        })
        .map_ok(|rows| stream::iter(rows.into_iter().map(Ok::<T, DbError>)))
        .try_flatten()
    }

    pub async fn exists(&self, stmt: Select) -> Result<bool> {
        let found = self.session.fetch_i64(&mut stmt.exists_query()).await?;
        Ok(found != 0)
    }

    /// Rows the statement returns, limit and offset included.
    pub async fn count(&self, stmt: Select) -> Result<u64> {
        let count = self.session.fetch_i64(&mut stmt.count_query()).await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// `(value, label)` pairs for select widgets.
    pub async fn choices<T, V, L>(
        &self,
        stmt: Select,
        value: impl Fn(&T) -> V,
        label: impl Fn(&T) -> L,
    ) -> Result<Vec<(V, L)>>
    where
        T: Record,
    {
        let rows = self.all::<T>(stmt).await?;
        Ok(rows.iter().map(|row| (value(row), label(row))).collect())
    }
}
