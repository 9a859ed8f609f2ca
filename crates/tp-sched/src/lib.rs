//! `tp-sched`: the tick loop of the traffic dispatch planner.
//!
//! # Tick phases
//!
//! ```text
//! refresh   - lane occupancy → road weights → all-pairs table
//! ① Origins - admit vehicles whose departure time has come, decide their
//!             first road, queue them per (road, direction)
//! ② Motion  - every lane, ascending road id; heads that cannot stay on
//!             their road start waiting and get a next hop
//! ③ Release - priority vehicles at their origin depart
//! ④ Arbiter - per intersection in ascending id, per incoming road in
//!             ascending id: grant waiting heads passage until a full pass
//!             makes no progress; anything still waiting is a deadlock
//! ⑤ Release - all queued origin vehicles depart where a lane has room
//! ```
//!
//! # Recovery
//!
//! Every `snapshot_interval` ticks the planning state is snapshotted.  A
//! deadlock penalizes the roads it happened on, rolls back one or more
//! snapshots, and cuts the [`Admission`] budget.  A run that keeps
//! deadlocking without any new arrival ends in
//! [`SchedError::Unschedulable`].
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Computes the all-pairs table on Rayon's thread pool.    |
//! | `serde`    | Serializes reports and the [`PlanSummary`].             |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tp_fleet::VehicleRegistry;
//! use tp_sched::{LogObserver, SchedulerBuilder};
//!
//! let fleet = VehicleRegistry::from_records(cars, &network)?;
//! let mut scheduler = SchedulerBuilder::new(network, fleet).build()?;
//! let summary = scheduler.plan(&mut LogObserver::default())?;
//! ```

pub mod admission;
pub mod builder;
mod decide;
pub mod error;
pub mod observer;
pub mod scheduler;
mod snapshot;
pub mod summary;


pub use admission::Admission;
pub use builder::SchedulerBuilder;
pub use error::{SchedError, SchedResult};
pub use observer::{Census, DeadlockReport, LogObserver, NoopObserver, PlanObserver, TickReport};
pub use scheduler::{TickOutcome, TrafficScheduler};
pub use summary::PlanSummary;
