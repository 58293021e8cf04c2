//! Pagination over statements and request query strings

use std::collections::HashMap;
use std::convert::Infallible;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum::http::Uri;
use dbkit_core::{Page, PageError};
use serde::Deserialize;

use crate::db::{DbSession, Record, Select};
use crate::error::Result;
use crate::query::query;

/// Default items per page
const DEFAULT_PAGE_SIZE: u64 = 20;

/// Maximum items per page
const MAX_PAGE_SIZE: u64 = 100;

/// A resolved page position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number (1-indexed)
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// Page and page size are raised to at least 1.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// SQL OFFSET for this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// How to read a page position out of a query string.
///
/// Put one in the request extensions to change what the [`PageRequest`]
/// extractor resolves against:
///
/// ```ignore
/// let app = Router::new()
///     .route("/users", get(list_users))
///     .layer(Extension(PageParams::default().page_size_param("per_page")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageParams {
    pub page_param: String,
    pub page_size_param: String,
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page_param: "page".to_owned(),
            page_size_param: "page_size".to_owned(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl PageParams {
    pub fn page_param(mut self, name: impl Into<String>) -> Self {
        self.page_param = name.into();
        self
    }

    pub fn page_size_param(mut self, name: impl Into<String>) -> Self {
        self.page_size_param = name.into();
        self
    }

    pub fn default_page_size(mut self, size: u64) -> Self {
        self.default_page_size = size;
        self
    }

    pub fn max_page_size(mut self, size: u64) -> Self {
        self.max_page_size = size;
        self
    }

    pub fn resolve(&self, uri: &Uri) -> PageRequest {
        PageRequest {
            page: page_value(uri, &self.page_param),
            page_size: page_size_value(
                uri,
                &self.page_size_param,
                self.default_page_size,
                self.max_page_size,
            ),
        }
    }
}

fn query_param(uri: &Uri, name: &str) -> Option<u64> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri).ok()?;
    params.get(name)?.trim().parse().ok()
}

/// Page number from the query string; missing, malformed or 0 gives 1.
pub fn page_value(uri: &Uri, param: &str) -> u64 {
    query_param(uri, param).filter(|page| *page > 0).unwrap_or(1)
}

/// Page size from the query string, falling back to `default` and kept
/// within `1..=max`.
pub fn page_size_value(uri: &Uri, param: &str, default: u64, max: u64) -> u64 {
    query_param(uri, param).unwrap_or(default).min(max).max(1)
}

/// Fills [`Page`]s from statements on one session.
#[derive(Debug, Clone, Copy)]
pub struct Paginator<'s> {
    session: &'s DbSession,
}

impl<'s> Paginator<'s> {
    pub fn new(session: &'s DbSession) -> Self {
        Self { session }
    }

    /// Count the statement's rows, then fetch the requested slice.
    ///
    /// The count ignores the statement's limit, offset and ordering. The
    /// slice keeps the statement's ordering as-is. Pages past the end are
    /// returned empty.
    ///
    /// # Errors
    ///
    /// [`DbError::Page`](crate::DbError::Page) for a zero page size, and
    /// any database error unchanged.
    pub async fn paginate<T: Record>(
        &self,
        stmt: Select,
        page: u64,
        page_size: u64,
    ) -> Result<Page<T>> {
        if page_size == 0 {
            return Err(PageError::ZeroPageSize.into());
        }
        let request = PageRequest::new(page, page_size);
        let q = query(self.session);

        let total = q
            .count(stmt.clone().without_limits().without_order())
            .await?;
        let rows = if request.offset() >= total {
            Vec::new()
        } else {
            q.all::<T>(stmt.limit(request.limit()).offset(request.offset()))
                .await?
                .into_vec()
        };

        tracing::debug!(
            rows = rows.len(),
            total,
            page = request.page,
            page_size,
            "paginated"
        );

        Ok(Page::new(rows, total, request.page, request.page_size)?)
    }

    pub async fn paginate_request<T: Record>(
        &self,
        stmt: Select,
        request: PageRequest,
    ) -> Result<Page<T>> {
        self.paginate(stmt, request.page, request.page_size).await
    }

    /// Read the page position from `uri` and paginate.
    pub async fn paginate_from_request<T: Record>(
        &self,
        uri: &Uri,
        stmt: Select,
        params: &PageParams,
    ) -> Result<Page<T>> {
        self.paginate_request(stmt, params.resolve(uri)).await
    }
}

impl<S> FromRequestParts<S> for PageRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request = match parts.extensions.get::<PageParams>() {
            Some(params) => params.resolve(&parts.uri),
            None => PageParams::default().resolve(&parts.uri),
        };
        Ok(request)
    }
}
