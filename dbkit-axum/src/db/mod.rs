//! Database layer - connection pool, sessions and statements
//!
//! # Design Principles
//!
//! - One pooled connection per session, held for the session's lifetime
//! - Statements are plain values; nothing runs until a session executes them
//! - Every bound value goes through a placeholder, never into the SQL text

pub mod pool;
pub mod session;
pub mod statement;
pub mod value;

use sqlx::sqlite::SqliteRow;
use sqlx::FromRow;

pub use pool::{create_pool, create_pool_with_options};
pub use session::{DbSession, SessionFactory};
pub use statement::{col, Column, CompareOp, Condition, Select};
pub use value::Value;

/// Row types that can be decoded from a SQLite result row.
pub trait Record: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {}

impl<T> Record for T where T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin {}
