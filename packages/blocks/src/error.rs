use crate::kind::{BlockKind, UnknownKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlockError {
    #[error("Expected a block object, found {0}")]
    NotAnObject(&'static str),

    #[error("Block type {0} is not enabled")]
    KindDisabled(BlockKind),

    #[error(transparent)]
    UnknownKind(#[from] UnknownKind),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type BlockResult<T> = Result<T, BlockError>;
