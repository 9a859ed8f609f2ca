//! The `TrafficScheduler` and its tick loop.

use tp_core::{CrossId, Direction, PlannerConfig, RoadId, Tick, VehicleId};
use tp_fleet::{Location, NextHop, VehicleRegistry};
use tp_lanes::{CrossOutcome, LaneSimulator};
use tp_network::{AllPairs, DijkstraRouter, RoadNetwork, Router};

use crate::admission::Admission;
use crate::decide::Decider;
use crate::snapshot::{PlanState, Snapshot};
use crate::{Census, DeadlockReport, PlanObserver, PlanSummary, SchedError, SchedResult, TickReport};

/// Result of one tick.
#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    Clean(TickReport),
    /// Arbitration stopped making progress.  The tick's partial moves are
    /// still in place; recovery rolls them back.
    Deadlock(DeadlockReport),
}

impl TickOutcome {
    pub fn is_deadlock(&self) -> bool {
        matches!(self, TickOutcome::Deadlock(_))
    }
}

/// Deadlock recovery bookkeeping.
#[derive(Clone, Debug)]
pub(crate) struct Recovery {
    /// The previous tick deadlocked; roll back before the next one.
    pub block:        bool,
    pub last_block:   Option<Tick>,
    /// Snapshots to walk back on the next rollback.
    pub step:         u32,
    /// Most vehicles ever seen arrived; a new maximum counts as progress.
    pub best_arrived: usize,
    /// Deadlocks since the last progress.
    pub retries:      u32,
}

impl Recovery {
    pub fn new(initial_step: u32) -> Self {
        Self { block: false, last_block: None, step: initial_step, best_arrived: 0, retries: 0 }
    }
}

// ── TrafficScheduler ──────────────────────────────────────────────────────────

/// The planner: owns the network, the fleet, and the lanes, and advances
/// them tick by tick until every vehicle has arrived.
///
/// Each tick runs five phases:
///
/// 1. **Origins**: admit vehicles whose departure time has come, decide
///    their first road, and queue them per road and direction.
/// 2. **Motion**: move every vehicle that stays on its road; vehicles
///    reaching the end start waiting and get a next hop.
/// 3. **Priority release**: priority vehicles at their origin depart.
/// 4. **Arbitration**: grant waiting vehicles passage, intersection by
///    intersection in ascending id, until a full pass makes no progress.
///    Vehicles still waiting then mean deadlock.
/// 5. **Release**: all queued origin vehicles try to depart.
///
/// Before each tick, occupancy is pushed into the network and the all-pairs
/// table is recomputed.  [`run_to_completion`](Self::run_to_completion) adds
/// periodic snapshots and rollback on deadlock around this loop.
///
/// Create via [`SchedulerBuilder`][crate::SchedulerBuilder].
pub struct TrafficScheduler<R: Router = DijkstraRouter> {
    pub config:  PlannerConfig,
    pub network: RoadNetwork,
    pub fleet:   VehicleRegistry,
    pub lanes:   LaneSimulator,

    pub(crate) state:    PlanState,
    pub(crate) table:    AllPairs,
    pub(crate) router:   R,
    pub(crate) history:  Vec<Snapshot>,
    pub(crate) recovery: Recovery,
    /// Per road and direction, origin vehicles ready to depart this tick.
    pub(crate) origin_queues: Vec<[Vec<VehicleId>; 2]>,
    /// Calibration mode: dynamic vehicles are never admitted.
    pub(crate) only_preset: bool,
    pub(crate) key_roads:   Option<usize>,
    pub(crate) deadlocks:   usize,
    pub(crate) rollbacks:   usize,
    pub(crate) released:    usize,
}

impl<R: Router> TrafficScheduler<R> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Calibrate, run every vehicle to its destination, and summarize.
    pub fn plan<O: PlanObserver>(&mut self, observer: &mut O) -> SchedResult<PlanSummary> {
        self.calibrate(observer)?;
        self.run_to_completion(observer)?;
        let summary = self.summary();
        observer.on_plan_end(&summary);
        Ok(summary)
    }

    /// Run with snapshot and rollback recovery until every vehicle has
    /// arrived.
    pub fn run_to_completion<O: PlanObserver>(&mut self, observer: &mut O) -> SchedResult<()> {
        self.drive_until(observer, |s| s.is_finished())
    }

    /// Refresh congestion and run exactly one tick, without recovery.
    ///
    /// The clock only advances on a clean tick.  After a deadlock the state
    /// holds the tick's partial moves; roll back before stepping again.
    pub fn step<O: PlanObserver>(&mut self, observer: &mut O) -> SchedResult<TickOutcome> {
        self.refresh()?;
        let outcome = self.run_tick(observer)?;
        if !outcome.is_deadlock() {
            self.state.admission.on_clean_tick(&self.config.admission);
            self.state.tick = self.state.tick.next();
        }
        Ok(outcome)
    }

    /// Append a snapshot of the current state to the history.
    pub fn save_snapshot(&mut self) {
        self.history.push(self.capture());
    }

    /// Restore the `k`-th most recent snapshot (the oldest if there are
    /// fewer) and discard every later one.  Returns the restored tick.
    pub fn rollback(&mut self, k: usize) -> SchedResult<Tick> {
        if self.history.is_empty() {
            return Err(SchedError::Unschedulable { tick: self.state.tick });
        }
        let index = self.history.len().saturating_sub(k.max(1));
        self.history.truncate(index + 1);
        let snapshot = self.history[index].clone();
        self.restore(snapshot);
        self.rollbacks += 1;
        Ok(self.state.tick)
    }

    #[inline]
    pub fn tick(&self) -> Tick {
        self.state.tick
    }

    /// No vehicle is left at its origin or on the road.
    pub fn is_finished(&self) -> bool {
        self.state.census.at_origin == 0 && self.state.census.on_road == 0
    }

    pub fn census(&self) -> Census {
        self.state.census
    }

    pub fn admission(&self) -> Admission {
        self.state.admission
    }

    /// Vehicles currently holding an admission slot.
    pub fn admitted(&self) -> usize {
        self.state.admitted.len()
    }

    pub fn snapshot_count(&self) -> usize {
        self.history.len()
    }

    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary {
            total_ticks: self.state.tick.0,
            released: self.released,
            deadlocks: self.deadlocks,
            rollbacks: self.rollbacks,
            key_roads: self.key_roads.unwrap_or(0),
            ..PlanSummary::default()
        };
        summary.travel(&self.fleet);
        summary
    }

    // ── Recovery loop ─────────────────────────────────────────────────────

    pub(crate) fn drive_until<O, F>(&mut self, observer: &mut O, done: F) -> SchedResult<()>
    where
        O: PlanObserver,
        F: Fn(&Self) -> bool,
    {
        while !done(&*self) {
            let interval = self.config.recovery.snapshot_interval;
            if self.recovery.block {
                let from = self.state.tick;
                let to = self.rollback(self.recovery.step as usize)?;
                self.state.admission.on_rollback(&self.config.admission, self.recovery.step);
                observer.on_rollback(from, to);
            } else if self.state.tick.0.is_multiple_of(interval) {
                self.save_snapshot();
                self.state.admission.on_snapshot(&self.config.admission);
                observer.on_snapshot(self.state.tick);
            }

            self.refresh()?;
            let now = self.state.tick;
            match self.run_tick(observer)? {
                TickOutcome::Deadlock(report) => {
                    self.on_deadlock(now, &report)?;
                    // Stay on this tick; the next iteration rolls back.
                    continue;
                }
                TickOutcome::Clean(_) => self.on_clean(now),
            }
            self.state.tick = now.next();
        }
        Ok(())
    }

    fn on_deadlock(&mut self, now: Tick, report: &DeadlockReport) -> SchedResult<()> {
        let rc = &self.config.recovery;
        for &road in &report.waiting {
            self.network.add_penalty(road, rc.penalty_step);
        }
        let same_window = self
            .recovery
            .last_block
            .is_some_and(|t| t.window(rc.snapshot_interval) == now.window(rc.snapshot_interval));
        self.recovery.step = if same_window { self.recovery.step + 1 } else { rc.initial_retry_step };
        self.recovery.last_block = Some(now);
        self.recovery.block = true;
        self.recovery.retries += 1;
        self.deadlocks += 1;
        if self.recovery.retries > rc.max_rollback_retries {
            return Err(SchedError::Unschedulable { tick: now });
        }
        Ok(())
    }

    fn on_clean(&mut self, now: Tick) {
        self.recovery.block = false;
        self.state.admission.on_clean_tick(&self.config.admission);
        if self.recovery.last_block.is_some_and(|t| now > t) {
            self.network.decay_penalties(self.config.recovery.penalty_decay);
        }
        if self.state.census.arrived > self.recovery.best_arrived {
            self.recovery.best_arrived = self.state.census.arrived;
            self.recovery.retries = 0;
        }
    }

    pub(crate) fn capture(&self) -> Snapshot {
        Snapshot {
            state:    self.state.clone(),
            journeys: self.fleet.journeys.clone(),
            states:   self.fleet.states.clone(),
            lanes:    self.lanes.clone(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.state = snapshot.state;
        self.fleet.journeys = snapshot.journeys;
        self.fleet.states = snapshot.states;
        self.lanes = snapshot.lanes;
    }

    // ── Congestion refresh ────────────────────────────────────────────────

    /// Push lane occupancy into the network and recompute the all-pairs
    /// table.  Key roads are marked on the first refresh.
    fn refresh(&mut self) -> SchedResult<()> {
        for r in 0..self.network.road_count() {
            let road = RoadId(r as u32);
            for dir in Direction::BOTH {
                let set = self.lanes.lanes(road, dir);
                if set.lane_count() == 0 {
                    continue;
                }
                let total = set.vehicle_count() as u32;
                let fixed = set.iter().filter(|&v| self.fleet.follows_preset(v)).count() as u32;
                self.network.set_occupancy(road, dir, total - fixed, fixed);
            }
        }
        self.table = AllPairs::compute(&self.network)?;
        if self.key_roads.is_none() {
            self.key_roads = Some(self.network.mark_key_roads(&self.table));
        }
        Ok(())
    }

    // ── One tick ──────────────────────────────────────────────────────────

    pub(crate) fn run_tick<O: PlanObserver>(&mut self, observer: &mut O) -> SchedResult<TickOutcome> {
        let now = self.state.tick;
        observer.on_tick_start(now);

        let mut waiting = 0;
        self.prepare_origins(now)?;
        self.drive_all(&mut waiting)?;
        self.release_all_origins(now, true)?;

        if !self.arbitrate(now, &mut waiting)? {
            let report = DeadlockReport { tick: now, waiting: self.waiting_roads() };
            self.fleet.reset_transit_states();
            observer.on_deadlock(&report);
            return Ok(TickOutcome::Deadlock(report));
        }

        self.release_all_origins(now, false)?;
        self.fleet.reset_transit_states();

        let report = TickReport {
            tick:     now,
            census:   self.state.census,
            admitted: self.state.admitted.len(),
            budget:   self.state.admission.budget,
        };
        observer.on_tick_end(&report);
        Ok(TickOutcome::Clean(report))
    }

    /// Current road of every vehicle left waiting.
    fn waiting_roads(&self) -> Vec<RoadId> {
        self.fleet
            .states
            .iter()
            .filter(|s| s.location == Location::OnRoad && s.is_waiting())
            .map(|s| s.road)
            .collect()
    }

    fn drive_all(&mut self, waiting: &mut usize) -> SchedResult<()> {
        let decider = Decider { network: &self.network, table: &self.table, router: &self.router };
        self.lanes
            .drive_all(&self.network, &mut self.fleet, waiting, &mut |fleet, v| decider.decide_waiting(fleet, v))
    }

    // ── Origins ───────────────────────────────────────────────────────────

    fn admits(&self, priority: bool) -> bool {
        !self.only_preset
            && self.state.admission.allows(
                &self.config.admission,
                self.state.admitted.len(),
                self.state.census.priority_on_road,
                priority,
            )
    }

    /// Give up a dynamic vehicle's admission slot and pending decision.
    fn withdraw(&mut self, v: VehicleId) {
        let journey = self.fleet.journey_mut(v);
        journey.route.clear();
        journey.start_time = None;
        self.state.admitted.remove(&v);
    }

    /// Admit and decide origin vehicles, then fill the per-road queues.
    fn prepare_origins(&mut self, now: Tick) -> SchedResult<()> {
        for queues in &mut self.origin_queues {
            queues[0].clear();
            queues[1].clear();
        }

        if !self.state.garage_sorted && self.state.garage.len() < self.config.admission.speed_sort_limit {
            let fleet = &self.fleet;
            self.state.garage.sort_by_key(|&v| fleet.vehicle(v).max_speed);
            self.state.garage_sorted = true;
        }

        let garage = std::mem::take(&mut self.state.garage);
        let mut kept = Vec::with_capacity(garage.len());
        let mut ready = Vec::new();
        for v in garage {
            if self.fleet.state(v).location != Location::AtOrigin {
                continue;
            }
            let (preset, priority, plan_time) = {
                let veh = self.fleet.vehicle(v);
                (veh.preset, veh.priority, veh.plan_time)
            };
            if !preset && now >= plan_time {
                if self.state.admitted.contains(&v) || self.admits(priority) {
                    self.fleet.journey_mut(v).start_time = Some(now);
                } else {
                    self.withdraw(v);
                }
            }
            if self.fleet.journey(v).start_time.is_some_and(|t| t <= now) {
                let decider = Decider { network: &self.network, table: &self.table, router: &self.router };
                if decider.decide(&mut self.fleet, v)? {
                    self.state.admitted.insert(v);
                    ready.push(v);
                } else {
                    self.withdraw(v);
                }
            }
            kept.push(v);
        }
        self.state.garage = kept;

        for v in ready {
            let NextHop::Road(road) = self.fleet.state(v).next else {
                return Err(SchedError::Invariant(format!("{v} ready at its origin without a first road")));
            };
            let src = self.fleet.vehicle(v).src;
            let Some(dir) = self.network.road(road).direction_from(src) else {
                return Err(SchedError::Invariant(format!("{v} cannot leave its origin along {road}")));
            };
            self.origin_queues[road.index()][dir.index()].push(v);
        }

        let fleet = &self.fleet;
        for queue in self.origin_queues.iter_mut().flatten().filter(|q| q.len() > 1) {
            queue.sort_by_key(|&v| {
                let veh = fleet.vehicle(v);
                (!veh.priority, fleet.journey(v).start_time, veh.id)
            });
        }
        Ok(())
    }

    fn release_all_origins(&mut self, now: Tick, priority_only: bool) -> SchedResult<()> {
        for r in 0..self.network.road_count() {
            for dir in Direction::BOTH {
                self.release_origins(RoadId(r as u32), dir, now, priority_only)?;
            }
        }
        Ok(())
    }

    /// Let queued origin vehicles depart onto `road` in `dir`, in queue
    /// order.  With `priority_only` the first regular vehicle ends the
    /// release.
    fn release_origins(&mut self, road: RoadId, dir: Direction, now: Tick, priority_only: bool) -> SchedResult<()> {
        let queue = std::mem::take(&mut self.origin_queues[road.index()][dir.index()]);
        let mut result: SchedResult<()> = Ok(());
        for &v in &queue {
            if priority_only && !self.fleet.vehicle(v).priority {
                break;
            }
            if self.fleet.state(v).location != Location::AtOrigin {
                continue;
            }
            match self.lanes.depart(&self.network, &mut self.fleet, v) {
                Ok(true) => self.on_departed(v, now),
                Ok(false) => {}
                Err(e) => {
                    result = Err(e.into());
                    break;
                }
            }
        }
        self.origin_queues[road.index()][dir.index()] = queue;
        result
    }

    fn on_departed(&mut self, v: VehicleId, now: Tick) {
        let (priority, preset) = {
            let veh = self.fleet.vehicle(v);
            (veh.priority, veh.preset)
        };
        let census = &mut self.state.census;
        census.at_origin -= 1;
        census.on_road += 1;
        census.priority_on_road += priority as usize;
        census.preset_on_road += preset as usize;
        self.fleet.journey_mut(v).entry_time = Some(now);
    }

    fn on_arrived(&mut self, v: VehicleId, now: Tick) {
        let (priority, preset) = {
            let veh = self.fleet.vehicle(v);
            (veh.priority, veh.preset)
        };
        let census = &mut self.state.census;
        census.on_road -= 1;
        census.arrived += 1;
        census.priority_on_road -= priority as usize;
        census.preset_on_road -= preset as usize;
        self.fleet.journey_mut(v).arrival_time = Some(now);
        self.state.admitted.remove(&v);
    }

    // ── Arbitration ───────────────────────────────────────────────────────

    /// Repeat arbitration passes until nothing waits.  `false` if a full
    /// pass leaves the waiting count unchanged.
    fn arbitrate(&mut self, now: Tick, waiting: &mut usize) -> SchedResult<bool> {
        let mut before = *waiting;
        while before > 0 {
            for c in 0..self.network.cross_count() {
                self.arbitrate_cross(CrossId(c as u32), now, waiting)?;
            }
            if *waiting >= before {
                return Ok(false);
            }
            before = *waiting;
        }
        Ok(true)
    }

    fn arbitrate_cross(&mut self, cross: CrossId, now: Tick, waiting: &mut usize) -> SchedResult<()> {
        for i in 0..self.network.cross(cross).by_road_id.len() {
            let road = self.network.cross(cross).by_road_id[i];
            let Some(dir) = self.network.road(road).direction_into(cross) else { continue };

            while let Some(v) = self.lanes.lanes(road, dir).candidate(&self.fleet) {
                if self.lanes.yields(&self.network, &self.fleet, cross, v)? {
                    break;
                }
                let lane = self.fleet.state(v).lane;
                match self.lanes.cross_to(&self.network, &mut self.fleet, v, cross)? {
                    CrossOutcome::Blocked => break,
                    CrossOutcome::Arrived => self.on_arrived(v, now),
                    CrossOutcome::HeldAtEnd | CrossOutcome::Entered => {}
                }
                *waiting -= 1;

                let decider = Decider { network: &self.network, table: &self.table, router: &self.router };
                self.lanes.drive_lane(road, dir, lane, &self.network, &mut self.fleet, waiting, &mut |fleet, v| {
                    decider.decide_waiting(fleet, v)
                })?;
                self.release_origins(road, dir, now, true)?;
            }
        }
        Ok(())
    }

    // ── Calibration ───────────────────────────────────────────────────────

    /// Dry-run the preset vehicles alone and release the most delayed share
    /// of them to dynamic routing.
    ///
    /// Priority vehicles are released last; among the rest, the largest
    /// delay between scheduled departure and arrival goes first.  All state
    /// except the release flags is restored afterwards.  Returns the number
    /// released.
    pub fn calibrate<O: PlanObserver>(&mut self, observer: &mut O) -> SchedResult<usize> {
        let presets: Vec<VehicleId> = self.fleet.ids().filter(|&v| self.fleet.vehicle(v).preset).collect();
        if !self.config.calibration.enabled || presets.is_empty() {
            return Ok(0);
        }

        let baseline = self.capture();
        let recovery = self.recovery.clone();
        self.only_preset = true;
        let result = self.drive_until(observer, |s| {
            s.fleet
                .vehicles
                .iter()
                .zip(&s.fleet.states)
                .all(|(veh, st)| !veh.preset || st.location == Location::Arrived)
        });
        self.only_preset = false;
        result?;

        let delay = |v: VehicleId| {
            let j = self.fleet.journey(v);
            let start = j.start_time.unwrap_or(self.fleet.vehicle(v).plan_time);
            j.arrival_time.map_or(0, |t| t.since(start))
        };
        let mut order: Vec<(bool, u32, u32, VehicleId)> = presets
            .iter()
            .map(|&v| (self.fleet.vehicle(v).priority, delay(v), self.fleet.vehicle(v).id, v))
            .collect();
        order.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)));

        self.restore(baseline);
        self.history.clear();
        self.recovery = recovery;
        self.network.reset_penalties();

        let count = (presets.len() as f64 * self.config.calibration.release_fraction).floor() as usize;
        for &(_, _, _, v) in order.iter().take(count) {
            let journey = self.fleet.journey_mut(v);
            journey.released = true;
            journey.route.clear();
        }
        self.released = count;
        observer.on_calibrated(count);
        Ok(count)
    }
}
