use thiserror::Error;

/// Errors from the shared helpers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("Invalid slug: {0:?}")]
    InvalidSlug(String),
}
