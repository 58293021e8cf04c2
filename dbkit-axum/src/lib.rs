//! dbkit-axum: repository and pagination helpers over sqlx, with
//! request-scoped database sessions for axum.
//!
//! The database layer lives in [`db`], [`query`], [`repo`] and
//! [`pagination`]; the web layer (session middleware, extractors, JSON
//! errors) lives in [`http`].

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod pagination;
pub mod query;
pub mod repo;

pub use dbkit_core::{Choice, Collection, Page, PageError, PaginationStyle, SlidingStyle};

pub use config::DbConfig;
pub use db::{col, create_pool, Column, Condition, DbSession, Record, Select, SessionFactory, Value};
pub use error::{DbError, Result};
pub use http::{db_session, ApiError};
pub use pagination::{page_size_value, page_value, PageParams, PageRequest, Paginator};
pub use query::{query, Query};
pub use repo::{And, Model, Repo, RepoFilter, RepoFilterExt};
