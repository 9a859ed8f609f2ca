//! Error types for tp-io.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: {reason}")]
    Parse { line: u64, reason: String },

    /// A vehicle due in the answer never left its origin.
    #[error("vehicle {vehicle} has no departure to report")]
    Unplanned { vehicle: u32 },
}

/// Alias for `Result<T, IoError>`.
pub type IoResult<T> = Result<T, IoError>;
