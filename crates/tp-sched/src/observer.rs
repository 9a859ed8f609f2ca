//! Planner observer trait for progress reporting.

use tp_core::{RoadId, Tick};

use crate::PlanSummary;

/// Vehicle counts at the end of a tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Census {
    pub at_origin:        usize,
    pub on_road:          usize,
    pub arrived:          usize,
    pub priority_on_road: usize,
    pub preset_on_road:   usize,
}

/// Summary of one clean tick.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TickReport {
    pub tick:     Tick,
    pub census:   Census,
    /// Vehicles currently holding an admission slot.
    pub admitted: usize,
    pub budget:   u32,
}

/// A tick in which arbitration stopped making progress.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DeadlockReport {
    pub tick:    Tick,
    /// Current road of every vehicle left waiting, one entry per vehicle.
    pub waiting: Vec<RoadId>,
}

/// Callbacks invoked by [`TrafficScheduler`][crate::TrafficScheduler] at key
/// points of a planning run.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait PlanObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after a tick completes without deadlock.
    fn on_tick_end(&mut self, _report: &TickReport) {}

    /// Called after a snapshot has been stored.
    fn on_snapshot(&mut self, _tick: Tick) {}

    /// Called when a tick deadlocks, before recovery.
    fn on_deadlock(&mut self, _report: &DeadlockReport) {}

    /// Called after state has been restored from the snapshot at `to`.
    fn on_rollback(&mut self, _from: Tick, _to: Tick) {}

    /// Called once calibration has handed `released` preset vehicles over to
    /// dynamic routing.
    fn on_calibrated(&mut self, _released: usize) {}

    /// Called once after every vehicle has arrived.
    fn on_plan_end(&mut self, _summary: &PlanSummary) {}
}

/// A [`PlanObserver`] that does nothing.
pub struct NoopObserver;

impl PlanObserver for NoopObserver {}

/// A [`PlanObserver`] that forwards every hook to the `log` facade.
///
/// Per-tick lines go to `debug`, deadlocks to `warn`, and recovery and
/// summary lines to `info`.
#[derive(Default)]
pub struct LogObserver {
    deadlocks: usize,
}

impl PlanObserver for LogObserver {
    fn on_tick_end(&mut self, r: &TickReport) {
        log::debug!(
            "{}: {} at origin, {} on road, {} arrived, {} priority and {} preset on road, {}/{} admitted",
            r.tick,
            r.census.at_origin,
            r.census.on_road,
            r.census.arrived,
            r.census.priority_on_road,
            r.census.preset_on_road,
            r.admitted,
            r.budget,
        );
    }

    fn on_snapshot(&mut self, tick: Tick) {
        log::trace!("snapshot at {tick}");
    }

    fn on_deadlock(&mut self, r: &DeadlockReport) {
        self.deadlocks += 1;
        let mut roads = r.waiting.clone();
        roads.sort_unstable();
        roads.dedup();
        log::warn!(
            "deadlock #{} at {}: {} vehicles waiting on {} roads",
            self.deadlocks,
            r.tick,
            r.waiting.len(),
            roads.len(),
        );
    }

    fn on_rollback(&mut self, from: Tick, to: Tick) {
        log::info!("rolled back from {from} to {to}");
    }

    fn on_calibrated(&mut self, released: usize) {
        log::info!("calibration released {released} preset vehicles to dynamic routing");
    }

    fn on_plan_end(&mut self, s: &PlanSummary) {
        log::info!(
            "plan finished at T{}: priority span {}, travel {} (priority {}), {} deadlocks, {} rollbacks",
            s.total_ticks,
            s.priority_span,
            s.total_travel,
            s.priority_travel,
            s.deadlocks,
            s.rollbacks,
        );
        if let (Some(schedule), Some(travel)) = (s.schedule_score(), s.travel_score()) {
            log::info!("weighted schedule {schedule:.0}, weighted travel {travel:.0}");
        }
    }
}
