use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Construction error: {0}")]
    Construction(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Column '{0}' not found in schema '{1}'")]
    ColumnNotFound(String, String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}
