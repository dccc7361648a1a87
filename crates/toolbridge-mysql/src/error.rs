#[derive(Debug, thiserror::Error)]
pub enum MysqlError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type MysqlResult<T> = Result<T, MysqlError>;
