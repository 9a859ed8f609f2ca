//! End-of-run statistics and the weighted score factors.

use rustc_hash::FxHashSet;

use tp_core::Tick;
use tp_fleet::VehicleRegistry;

/// Outcome of a completed planning run.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PlanSummary {
    /// Tick at which the last vehicle arrived, plus one.
    pub total_ticks:     u32,
    /// Last priority arrival minus the earliest priority plan time.
    pub priority_span:   u32,
    /// Sum over all vehicles of arrival minus plan time.
    pub total_travel:    u64,
    /// Same sum over priority vehicles only.
    pub priority_travel: u64,
    pub released:        usize,
    pub deadlocks:       usize,
    pub rollbacks:       usize,
    pub key_roads:       usize,
    /// Weight of `priority_span` in the schedule score.  `None` without
    /// priority vehicles.
    pub factor_a:        Option<f64>,
    /// Weight of `priority_travel` in the travel score.
    pub factor_b:        Option<f64>,
}

impl PlanSummary {
    /// `factor_a * priority_span + total_ticks`.
    pub fn schedule_score(&self) -> Option<f64> {
        self.factor_a.map(|a| a * self.priority_span as f64 + self.total_ticks as f64)
    }

    /// `factor_b * priority_travel + total_travel`.
    pub fn travel_score(&self) -> Option<f64> {
        self.factor_b.map(|b| b * self.priority_travel as f64 + self.total_travel as f64)
    }

    /// Fill the travel statistics from the arrival times in `fleet`.
    pub(crate) fn travel(&mut self, fleet: &VehicleRegistry) {
        let mut last_priority = None;
        let mut first_priority_plan = None;
        for (v, j) in fleet.vehicles.iter().zip(&fleet.journeys) {
            let Some(arrival) = j.arrival_time else { continue };
            let travel = arrival.since(v.plan_time) as u64;
            self.total_travel += travel;
            if v.priority {
                self.priority_travel += travel;
                last_priority = last_priority.max(Some(arrival));
                first_priority_plan = Some(first_priority_plan.map_or(v.plan_time, |t: Tick| t.min(v.plan_time)));
            }
        }
        if let (Some(last), Some(first)) = (last_priority, first_priority_plan) {
            self.priority_span = last.since(first);
        }
        (self.factor_a, self.factor_b) = match score_factors(fleet) {
            Some((a, b)) => (Some(a), Some(b)),
            None => (None, None),
        };
    }
}

/// Spread statistics of one vehicle class.
#[derive(Default)]
struct Spread {
    count:     usize,
    max_speed: u32,
    min_speed: u32,
    early:     u32,
    late:      u32,
    sources:   FxHashSet<u32>,
    dests:     FxHashSet<u32>,
}

impl Spread {
    fn add(&mut self, speed: u32, plan: u32, src: u32, dest: u32) {
        if self.count == 0 {
            (self.min_speed, self.early) = (speed, plan);
        }
        self.count += 1;
        self.max_speed = self.max_speed.max(speed);
        self.min_speed = self.min_speed.min(speed);
        self.early = self.early.min(plan);
        self.late = self.late.max(plan);
        self.sources.insert(src);
        self.dests.insert(dest);
    }

    fn speed_ratio(&self) -> f64 {
        ratio(self.max_speed, self.min_speed)
    }

    fn plan_ratio(&self) -> f64 {
        ratio(self.late, self.early)
    }
}

/// `hi / lo` with zero counted as one.
fn ratio(hi: u32, lo: u32) -> f64 {
    hi.max(1) as f64 / lo.max(1) as f64
}

/// The `(a, b)` weights of the priority terms, derived from how the priority
/// class compares to the whole fleet.
pub(crate) fn score_factors(fleet: &VehicleRegistry) -> Option<(f64, f64)> {
    let mut all = Spread::default();
    let mut prio = Spread::default();
    for v in &fleet.vehicles {
        let (src, dest) = (v.src.0, v.dest.0);
        all.add(v.max_speed, v.plan_time.0, src, dest);
        if v.priority {
            prio.add(v.max_speed, v.plan_time.0, src, dest);
        }
    }
    if prio.count == 0 {
        return None;
    }
    let f1 = all.count as f64 / prio.count as f64;
    let f2 = all.speed_ratio() / prio.speed_ratio();
    let f3 = all.plan_ratio() / prio.plan_ratio();
    let f4 = all.sources.len() as f64 / prio.sources.len() as f64;
    let f5 = all.dests.len() as f64 / prio.dests.len() as f64;
    let rest = f2 + f3 + f4 + f5;
    Some((0.05 * f1 + 0.2375 * rest, 0.8 * f1 + 0.05 * rest))
}
