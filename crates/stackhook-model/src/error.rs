use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid commit id: {0:?}")]
    InvalidCommit(String),

    #[error("invalid branch name: {0:?}")]
    InvalidBranch(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
