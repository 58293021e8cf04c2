//! dbkit-core: I/O-free building blocks for paginated database views.
//!
//! Nothing in this crate talks to a database. `dbkit-axum` fills
//! [`Page`]s from SQL queries and hands results out as [`Collection`]s.

pub mod collection;
pub mod error;
pub mod page;
pub mod style;

pub use collection::{Choice, Collection};
pub use error::PageError;
pub use page::Page;
pub use style::{PaginationStyle, SlidingStyle};
