//! Fluent builder for [`TrafficScheduler`].

use rustc_hash::FxHashSet;

use tp_core::{PlannerConfig, Tick};
use tp_fleet::VehicleRegistry;
use tp_lanes::LaneSimulator;
use tp_network::{AllPairs, DijkstraRouter, RoadNetwork, Router};

use crate::admission::Admission;
use crate::scheduler::Recovery;
use crate::snapshot::PlanState;
use crate::{Census, SchedError, SchedResult, TrafficScheduler};

/// Assembles a [`TrafficScheduler`] from a network and a loaded fleet.
///
/// # Example
///
/// ```rust,ignore
/// let mut scheduler = SchedulerBuilder::new(network, fleet)
///     .config(PlannerConfig::default())
///     .build()?;
/// let summary = scheduler.plan(&mut LogObserver::default())?;
/// ```
pub struct SchedulerBuilder<R: Router = DijkstraRouter> {
    network: RoadNetwork,
    fleet:   VehicleRegistry,
    config:  PlannerConfig,
    router:  R,
}

impl SchedulerBuilder<DijkstraRouter> {
    pub fn new(network: RoadNetwork, fleet: VehicleRegistry) -> Self {
        Self { network, fleet, config: PlannerConfig::default(), router: DijkstraRouter }
    }
}

impl<R: Router> SchedulerBuilder<R> {
    pub fn config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the single-pair router used for priority routes and
    /// turn-back fallbacks.
    pub fn router<R2: Router>(self, router: R2) -> SchedulerBuilder<R2> {
        SchedulerBuilder { network: self.network, fleet: self.fleet, config: self.config, router }
    }

    /// Validate the configuration and the preset routes, and compute the
    /// initial all-pairs table.
    pub fn build(self) -> SchedResult<TrafficScheduler<R>> {
        let SchedulerBuilder { mut network, fleet, config, router } = self;
        config.validate()?;

        if let Some(v) = fleet
            .ids()
            .find(|&v| fleet.vehicle(v).preset && fleet.journey(v).route.is_empty())
        {
            return Err(SchedError::Config(format!(
                "preset vehicle {} has no preset route",
                fleet.vehicle(v).id
            )));
        }

        network.weights = config.weights.clone();
        let table = AllPairs::compute(&network)?;
        let lanes = LaneSimulator::new(&network);

        let state = PlanState {
            tick:          Tick::ZERO,
            census:        Census { at_origin: fleet.len(), ..Census::default() },
            garage:        fleet.ids().collect(),
            garage_sorted: false,
            admitted:      FxHashSet::default(),
            admission:     Admission::new(&config.admission),
        };

        log::info!(
            "scheduler ready: {} roads, {} intersections, {} vehicles",
            network.road_count(),
            network.cross_count(),
            fleet.len()
        );

        Ok(TrafficScheduler {
            origin_queues: vec![[Vec::new(), Vec::new()]; network.road_count()],
            recovery: Recovery::new(config.recovery.initial_retry_step),
            config,
            network,
            fleet,
            lanes,
            state,
            table,
            router,
            history: Vec::new(),
            only_preset: false,
            key_roads: None,
            deadlocks: 0,
            rollbacks: 0,
            released: 0,
        })
    }
}
