use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Entity {gid} is a {actual}, expected a {expected}")]
    EntityKind {
        gid: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Numeric routine failed: {0}")]
    Numeric(String),

    #[error("Failed to parse input data: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, AdapterError>;
