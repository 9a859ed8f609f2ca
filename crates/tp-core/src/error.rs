//! Planner base error type.
//!
//! Sub-crates define their own error enums and wrap `TpError` as one variant
//! where they need configuration validation from this crate.

use thiserror::Error;

/// The base error type for `tp-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum TpError {
    /// Malformed or inconsistent input.  Fatal before simulation starts.
    #[error("configuration error: {0}")]
    Config(String),

    /// A logic defect detected at runtime.  Never recoverable.
    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `tp-core`.
pub type TpResult<T> = Result<T, TpError>;
