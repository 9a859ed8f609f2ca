//! `tp-core`: foundational types for the traffic dispatch planner.
//!
//! Every other `tp-*` crate depends on this one.  It has no `tp-*`
//! dependencies and only `thiserror` (plus optional `serde`) externally.
//!
//! # What lives here
//!
//! | Module          | Contents                                                 |
//! |-----------------|----------------------------------------------------------|
//! | [`ids`]         | `RoadId`, `CrossId`, `VehicleId`                         |
//! | [`time`]        | `Tick`                                                   |
//! | [`direction`]   | `Direction` (road travel sense), `Approach` (cross slot) |
//! | [`config`]      | `PlannerConfig` and its tuning groups                    |
//! | [`error`]       | `TpError`, `TpResult`                                    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod direction;
pub mod error;
pub mod ids;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{AdmissionConfig, CalibrationConfig, PlannerConfig, RecoveryConfig, WeightConfig};
pub use direction::{Approach, Direction};
pub use error::{TpError, TpResult};
pub use ids::{CrossId, RoadId, VehicleId};
pub use time::Tick;
