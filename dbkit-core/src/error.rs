/// Errors raised while building pagination views.
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageError {
    /// Page size of zero makes the page count undefined
    #[error("page size must be greater than zero")]
    ZeroPageSize,
}
