use thiserror::Error;

#[derive(Error, Debug)]
pub enum OdooError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("XML-RPC fault {code}: {message}")]
    Fault { code: i64, message: String },

    #[error("Malformed XML-RPC response: {0}")]
    Malformed(String),

    #[error("Authentication failed for database '{0}'")]
    AuthFailed(String),
}

pub type OdooResult<T> = Result<T, OdooError>;
