//! `tp-fleet`: the vehicle registry.
//!
//! # Storage
//!
//! Vehicles are stored struct-of-arrays style in three parallel `Vec`s
//! indexed by [`VehicleId`](tp_core::VehicleId):
//!
//! | Array       | Contents                                     | Mutability            |
//! |-------------|----------------------------------------------|-----------------------|
//! | `vehicles`  | [`Vehicle`]: source, destination, class, speed | immutable after load |
//! | `journeys`  | [`Journey`]: route and timestamps            | per hop, rolled back  |
//! | `states`    | [`VehicleState`]: placement and transit state | per tick, rolled back |
//!
//! Keeping the mutable parts separate lets a snapshot copy only what can
//! change, and lets the scheduler reset every transit state in one call.

pub mod error;
pub mod registry;
pub mod state;
pub mod vehicle;


pub use error::{FleetError, FleetResult};
pub use registry::VehicleRegistry;
pub use state::{Location, NextHop, Transit, VehicleState};
pub use vehicle::{Journey, PresetRecord, Vehicle, VehicleRecord};
