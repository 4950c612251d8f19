use thiserror::Error;

#[derive(Debug, Error)]
pub enum HermesError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV is not valid UTF-8")]
    Encoding,
}

pub type Result<T> = std::result::Result<T, HermesError>;
