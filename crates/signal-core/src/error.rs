use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignalError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid batch: {0}")]
    InvalidBatch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
