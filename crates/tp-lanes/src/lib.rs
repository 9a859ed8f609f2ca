//! `tp-lanes`: lane queues and the per-tick movement rules.
//!
//! A [`LaneSimulator`] owns, for every road and travel direction, a
//! [`LaneSet`]: one FIFO of [`VehicleId`](tp_core::VehicleId)s per lane.
//! Index 0 of each queue is the vehicle nearest the exit intersection.
//! Vehicle placement itself (offset, lane, transit state) lives in the
//! [`VehicleRegistry`](tp_fleet::VehicleRegistry); this crate keeps the two
//! consistent.
//!
//! # Per-tick operations
//!
//! | Operation                          | Module      |
//! |------------------------------------|-------------|
//! | motion pass over one lane or all   | `motion`    |
//! | origin departure, crossing a cross | `crossing`  |
//! | candidate pick, yield rule         | `arbiter`   |
//!
//! The tick loop itself (ordering, fixpoint, deadlock) lives in `tp-sched`.

pub mod arbiter;
pub mod crossing;
pub mod error;
pub mod lanes;
pub mod motion;


pub use arbiter::{YIELD_TABLE, resolved_exit};
pub use crossing::CrossOutcome;
pub use error::{LaneError, LaneResult};
pub use lanes::{LaneSet, LaneSimulator};
