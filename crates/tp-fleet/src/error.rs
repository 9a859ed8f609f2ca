use thiserror::Error;

/// Errors produced while loading the fleet.  All are configuration errors.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("vehicle {0} not found")]
    UnknownVehicle(u32),

    #[error("vehicle {vehicle} references unknown intersection {cross}")]
    UnknownCross { vehicle: u32, cross: u32 },

    #[error("vehicle {vehicle} references unknown road {road}")]
    UnknownRoad { vehicle: u32, road: u32 },

    #[error("duplicate vehicle id {0}")]
    Duplicate(u32),

    #[error("malformed vehicle {vehicle}: {reason}")]
    Malformed { vehicle: u32, reason: String },
}

pub type FleetResult<T> = Result<T, FleetError>;
