//! Network-subsystem error type.

use thiserror::Error;

use tp_core::{CrossId, RoadId};

/// Errors produced by `tp-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: CrossId, to: CrossId },

    #[error("road {0} not found in network")]
    UnknownRoad(u32),

    #[error("intersection {0} not found in network")]
    UnknownCross(u32),

    #[error("malformed network: {0}")]
    Malformed(String),

    #[error("network is disconnected: embedding reached {reached} of {total} intersections")]
    Disconnected { reached: usize, total: usize },

    #[error("invalid weight on {road}: {reason}")]
    InvalidWeight { road: RoadId, reason: String },
}

impl NetworkError {
    /// `true` for logic defects, `false` for bad input.
    pub fn is_invariant(&self) -> bool {
        matches!(self, NetworkError::InvalidWeight { .. })
    }
}

pub type NetworkResult<T> = Result<T, NetworkError>;
