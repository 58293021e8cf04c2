//! axum integration
//!
//! - [`db_session`]: middleware opening one [`DbSession`](crate::DbSession) per request
//! - `DbSession` extractor for handlers
//! - [`ApiError`]: JSON error responses

pub mod error;
pub mod extractors;
pub mod middleware;

pub use error::ApiError;
pub use middleware::db_session;
