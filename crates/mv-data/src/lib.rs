//! Dataset backends for the multi-view explorer

pub mod backends;
pub mod engine;
pub mod sources;

use thiserror::Error;
use tokio::task::JoinError;

use mv_core::QueryError;

// Re-exports
pub use backends::BackendRegistry;
pub use engine::{execute, QueryOutcome, Record};
pub use sources::{read_csv_records, MemoryDataset};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("Backend `{0}` needs a url")]
    MissingUrl(String),

    #[error("Join error: {0}")]
    Join(#[from] JoinError),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}

impl From<DataError> for QueryError {
    fn from(error: DataError) -> Self {
        QueryError::structured(Some("Data error"), Some(&error.to_string()))
    }
}
