//! Static vehicle attributes and the mutable journey record.

use tp_core::{CrossId, RoadId, Tick};

// ── Input records ─────────────────────────────────────────────────────────────

/// One vehicle as read from the car file.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleRecord {
    pub id:        u32,
    pub src:       u32,
    pub dest:      u32,
    pub max_speed: u32,
    pub plan_time: u32,
    pub priority:  bool,
    pub preset:    bool,
}

/// A predetermined departure time and route for one preset vehicle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PresetRecord {
    pub vehicle:    u32,
    pub start_time: u32,
    pub roads:      Vec<u32>,
}

// ── Vehicle ───────────────────────────────────────────────────────────────────

/// Attributes fixed at load time.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// External id from the input record.
    pub id:        u32,
    pub src:       CrossId,
    pub dest:      CrossId,
    pub max_speed: u32,
    /// Earliest departure.
    pub plan_time: Tick,
    pub priority:  bool,
    pub preset:    bool,
}

// ── Journey ───────────────────────────────────────────────────────────────────

/// Route and timestamps, extended one hop at a time as the vehicle needs
/// decisions.  Restored wholesale on rollback.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Journey {
    pub route:        Vec<RoadId>,
    /// Departure time; for dynamic vehicles rebound every tick until the
    /// vehicle actually leaves its origin.
    pub start_time:   Option<Tick>,
    /// Tick the vehicle entered its first road.
    pub entry_time:   Option<Tick>,
    pub arrival_time: Option<Tick>,
    /// A preset vehicle handed over to dynamic routing.
    pub released:     bool,
}
