use std::sync::PoisonError;
use thiserror::Error;

/// Error type for metrics sink operations
#[derive(Error, Debug)]
pub enum SinkError {
    /// Transport-level HTTP failure (connection refused, timeout, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The metrics store answered with a non-success status
    #[error("Write rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body, usually a JSON error document
        body: String,
    },

    /// A point cannot be encoded
    #[error("Invalid metric point: {0}")]
    InvalidPoint(String),

    /// Sink configuration error
    #[error("Sink configuration error: {0}")]
    Config(String),

    /// Mutex lock error
    #[error("Mutex lock error: {0}")]
    MutexLock(String),
}

impl<T> From<PoisonError<T>> for SinkError {
    fn from(error: PoisonError<T>) -> Self {
        SinkError::MutexLock(error.to_string())
    }
}
