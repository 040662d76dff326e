use thiserror::Error;

/// Errors raised while parsing or validating domain values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("invalid program: {0}")]
    InvalidProgram(String),

    #[error("invalid chat role: {0}")]
    InvalidChatRole(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
