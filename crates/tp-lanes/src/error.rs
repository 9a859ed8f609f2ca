use thiserror::Error;

/// Errors raised by lane operations.  Every variant is a logic defect.
#[derive(Debug, Error)]
pub enum LaneError {
    #[error("lane invariant violated: {0}")]
    Invariant(String),
}

pub type LaneResult<T> = Result<T, LaneError>;

/// Shorthand for building an [`LaneError::Invariant`].
macro_rules! invariant {
    ($($arg:tt)*) => {
        $crate::LaneError::Invariant(format!($($arg)*))
    };
}

pub(crate) use invariant;
