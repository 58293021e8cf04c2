//! Error types for dbkit-axum

use dbkit_core::PageError;
use thiserror::Error;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

/// Database layer error type
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A single row was required but the query matched none
    #[error("no row found when one was required")]
    NoResult,

    /// At most one row was allowed but the query matched several
    #[error("multiple rows found when at most one was allowed")]
    MultipleResults,

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("invalid pagination: {0}")]
    Page(#[from] PageError),
}

impl DbError {
    /// True for both "no row" flavors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoResult | Self::NotFound { .. })
    }
}
