//! Repositories: per-model lookups and listing over a session
//!
//! A [`Repo`] starts from the model's base query and narrows it with a
//! [`RepoFilter`]. Filters are anything that can rewrite a [`Select`]:
//! a [`Condition`], an `Option` of one, a list, or a custom type.
//!
//! ```ignore
//! let repo = Repo::<User>::new(&session);
//! let user = repo.get(1).await?;
//! let admins = repo.all(col("role").eq("admin")).await?;
//! let page = repo.paginate((), 2, 20).await?;
//! ```

use std::marker::PhantomData;
use std::ops::BitAnd;

use dbkit_core::{Collection, Page};

use crate::db::statement::qualify;
use crate::db::{col, Condition, DbSession, Record, Select, Value};
use crate::error::{DbError, Result};
use crate::pagination::Paginator;
use crate::query::{query, Query};

/// A table-backed row type.
pub trait Model: Record {
    const TABLE: &'static str;
    const PRIMARY_KEY: &'static str = "id";

    /// Statement every repository query starts from.
    fn base_query() -> Select {
        Select::from_table(Self::TABLE)
    }
}

/// Narrows a model's query.
pub trait RepoFilter<M: Model>: Send + Sync {
    fn apply(&self, stmt: Select) -> Select;
}

impl<M: Model> RepoFilter<M> for () {
    fn apply(&self, stmt: Select) -> Select {
        stmt
    }
}

impl<M: Model> RepoFilter<M> for Condition {
    fn apply(&self, stmt: Select) -> Select {
        stmt.filter(self.clone().qualified(M::TABLE))
    }
}

impl<M: Model, F: RepoFilter<M>> RepoFilter<M> for Option<F> {
    fn apply(&self, stmt: Select) -> Select {
        match self {
            Some(filter) => filter.apply(stmt),
            None => stmt,
        }
    }
}

impl<M: Model, F: RepoFilter<M> + ?Sized> RepoFilter<M> for &F {
    fn apply(&self, stmt: Select) -> Select {
        (**self).apply(stmt)
    }
}

impl<M: Model, F: RepoFilter<M> + ?Sized> RepoFilter<M> for Box<F> {
    fn apply(&self, stmt: Select) -> Select {
        (**self).apply(stmt)
    }
}

impl<M: Model, F: RepoFilter<M>> RepoFilter<M> for Vec<F> {
    fn apply(&self, stmt: Select) -> Select {
        self.iter().fold(stmt, |stmt, filter| filter.apply(stmt))
    }
}

/// Two filters applied in order.
#[derive(Debug, Clone)]
pub struct And<A, B>(pub A, pub B);

impl<M: Model, A: RepoFilter<M>, B: RepoFilter<M>> RepoFilter<M> for And<A, B> {
    fn apply(&self, stmt: Select) -> Select {
        self.1.apply(self.0.apply(stmt))
    }
}

impl<A, B, C> BitAnd<C> for And<A, B> {
    type Output = And<And<A, B>, C>;

    fn bitand(self, rhs: C) -> Self::Output {
        And(self, rhs)
    }
}

/// `.and(..)` for any filter.
///
/// [`Condition`] has an inherent `and` that only accepts another
/// `Condition`, so for a condition followed by a custom filter write
/// `And(condition, filter)` or start the chain from the custom filter.
pub trait RepoFilterExt<M: Model>: RepoFilter<M> + Sized {
    fn and<F: RepoFilter<M>>(self, other: F) -> And<Self, F> {
        And(self, other)
    }
}

impl<M: Model, T: RepoFilter<M>> RepoFilterExt<M> for T {}

/// Lookups for one model over one session.
pub struct Repo<'s, M> {
    session: &'s DbSession,
    base: Select,
    _model: PhantomData<fn() -> M>,
}

impl<'s, M: Model> Repo<'s, M> {
    pub fn new(session: &'s DbSession) -> Self {
        Self {
            session,
            base: M::base_query(),
            _model: PhantomData,
        }
    }

    /// Replace the model's base query, e.g. to add a join or a default scope.
    pub fn with_base_query(mut self, base: Select) -> Self {
        self.base = base;
        self
    }

    pub fn session(&self) -> &'s DbSession {
        self.session
    }

    pub fn base_query(&self) -> &Select {
        &self.base
    }

    /// The base query narrowed by `filter`.
    pub fn select(&self, filter: impl RepoFilter<M>) -> Select {
        filter.apply(self.base.clone())
    }

    fn query(&self) -> Query<'s> {
        query(self.session)
    }

    /// Fetch by primary key.
    ///
    /// # Errors
    ///
    /// [`DbError::NotFound`] when no row has that key.
    pub async fn get(&self, pk: impl Into<Value>) -> Result<M> {
        self.get_by(M::PRIMARY_KEY, pk).await
    }

    /// Fetch by an arbitrary unique column.
    pub async fn get_by(&self, column: &str, value: impl Into<Value>) -> Result<M> {
        let value = value.into();
        let id = value.to_string();
        self.get_or_none_by(column, value)
            .await?
            .ok_or(DbError::NotFound {
                resource: M::TABLE,
                id,
            })
    }

    pub async fn get_or_none(&self, pk: impl Into<Value>) -> Result<Option<M>> {
        self.get_or_none_by(M::PRIMARY_KEY, pk).await
    }

    pub async fn get_or_none_by(&self, column: &str, value: impl Into<Value>) -> Result<Option<M>> {
        let condition = col(qualify(M::TABLE, column.to_owned())).eq(value);
        self.query().one_or_none(self.base.clone().filter(condition)).await
    }

    pub async fn all(&self, filter: impl RepoFilter<M>) -> Result<Collection<M>> {
        self.query().all(self.select(filter)).await
    }

    pub async fn one(&self, filter: impl RepoFilter<M>) -> Result<M> {
        self.query().one(self.select(filter)).await
    }

    pub async fn one_or_none(&self, filter: impl RepoFilter<M>) -> Result<Option<M>> {
        self.query().one_or_none(self.select(filter)).await
    }

    pub async fn one_or_default(&self, filter: impl RepoFilter<M>, default: M) -> Result<M> {
        self.query().one_or_default(self.select(filter), default).await
    }

    /// Like [`one`](Self::one), but a missing row becomes `err`.
    ///
    /// More than one row is still [`DbError::MultipleResults`].
    pub async fn one_or_raise<E>(&self, filter: impl RepoFilter<M>, err: E) -> Result<M, E>
    where
        E: From<DbError>,
    {
        match self.one_or_none(filter).await? {
            Some(row) => Ok(row),
            None => Err(err),
        }
    }

    pub async fn count(&self, filter: impl RepoFilter<M>) -> Result<u64> {
        self.query().count(self.select(filter)).await
    }

    pub async fn exists(&self, filter: impl RepoFilter<M>) -> Result<bool> {
        self.query().exists(self.select(filter)).await
    }

    pub async fn paginate(
        &self,
        filter: impl RepoFilter<M>,
        page: u64,
        page_size: u64,
    ) -> Result<Page<M>> {
        Paginator::new(self.session)
            .paginate(self.select(filter), page, page_size)
            .await
    }
}

impl<M> std::fmt::Debug for Repo<'_, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repo")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}
