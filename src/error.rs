use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),
}

pub type SimResult<T> = Result<T, SimError>;
