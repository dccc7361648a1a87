#[derive(Debug, thiserror::Error)]
pub enum SageError {
    #[error("Database error: {0}")]
    Database(#[from] tiberius::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type SageResult<T> = Result<T, SageError>;
