//! Restorable copies of the mutable planning state.

use rustc_hash::FxHashSet;

use tp_core::{Tick, VehicleId};
use tp_fleet::{Journey, VehicleState};
use tp_lanes::LaneSimulator;

use crate::Census;
use crate::admission::Admission;

/// Scheduler bookkeeping that rolls back with the vehicles.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PlanState {
    pub tick:          Tick,
    pub census:        Census,
    /// Vehicles still at their origin, in visiting order.  Compacted every
    /// tick.
    pub garage:        Vec<VehicleId>,
    pub garage_sorted: bool,
    /// Vehicles holding an admission slot: decided to depart, or on the road.
    pub admitted:      FxHashSet<VehicleId>,
    pub admission:     Admission,
}

/// Everything needed to resume planning bit-for-bit from `state.tick`.
///
/// Road penalties are not part of a snapshot and survive a rollback.
#[derive(Clone, Debug)]
pub(crate) struct Snapshot {
    pub state:    PlanState,
    pub journeys: Vec<Journey>,
    pub states:   Vec<VehicleState>,
    pub lanes:    LaneSimulator,
}
