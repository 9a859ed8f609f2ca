use thiserror::Error;

use tp_core::{Tick, TpError};
use tp_fleet::FleetError;
use tp_lanes::LaneError;
use tp_network::NetworkError;

/// Errors that abort a planning run.
///
/// Deadlock is not among them: it is the [`TickOutcome::Deadlock`]
/// result of one tick and is consumed by the recovery loop.
///
/// [`TickOutcome::Deadlock`]: crate::TickOutcome::Deadlock
#[derive(Debug, Error)]
pub enum SchedError {
    #[error("scheduler configuration error: {0}")]
    Config(String),

    #[error("scheduler invariant violated: {0}")]
    Invariant(String),

    /// Rollback ran out of snapshots or retries: no schedule was found
    /// under any tried admission and penalty settings.
    #[error("no feasible schedule found (gave up at {tick})")]
    Unschedulable { tick: Tick },

    #[error(transparent)]
    Core(#[from] TpError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error(transparent)]
    Lane(#[from] LaneError),
}

impl SchedError {
    /// A logic defect rather than bad input.
    pub fn is_invariant(&self) -> bool {
        match self {
            SchedError::Invariant(_) | SchedError::Lane(_) => true,
            SchedError::Core(e) => matches!(e, TpError::Invariant(_)),
            SchedError::Network(e) => e.is_invariant(),
            _ => false,
        }
    }

    /// Bad or infeasible input.
    pub fn is_configuration(&self) -> bool {
        !self.is_invariant()
    }
}

pub type SchedResult<T> = Result<T, SchedError>;
