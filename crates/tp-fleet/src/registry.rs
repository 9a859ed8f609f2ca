//! The owned vehicle arena.

use rustc_hash::FxHashMap;

use tp_core::{CrossId, RoadId, Tick, VehicleId};
use tp_network::{RoadNetwork, VehicleProfile};

use crate::{FleetError, FleetResult, Journey, Location, PresetRecord, Vehicle, VehicleRecord, VehicleState};

/// All vehicles, their journeys, and their transit states.
///
/// Registration order is fixed at load: priority vehicles first, then by
/// ascending plan time, then faster vehicles first, then by external id.
/// `VehicleId`s follow that order and the answer file lists vehicles in it.
#[derive(Clone, Debug)]
pub struct VehicleRegistry {
    pub vehicles: Vec<Vehicle>,
    pub journeys: Vec<Journey>,
    pub states:   Vec<VehicleState>,
    index:        FxHashMap<u32, VehicleId>,
}

impl VehicleRegistry {
    /// Validate `records` against `network` and register them.
    pub fn from_records(mut records: Vec<VehicleRecord>, network: &RoadNetwork) -> FleetResult<Self> {
        records.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.plan_time.cmp(&b.plan_time))
                .then(b.max_speed.cmp(&a.max_speed))
                .then(a.id.cmp(&b.id))
        });

        let mut vehicles = Vec::with_capacity(records.len());
        let mut index = FxHashMap::default();
        for (i, rec) in records.iter().enumerate() {
            if index.insert(rec.id, VehicleId(i as u32)).is_some() {
                return Err(FleetError::Duplicate(rec.id));
            }
            let cross = |ext: u32| {
                network
                    .cross_id(ext)
                    .map_err(|_| FleetError::UnknownCross { vehicle: rec.id, cross: ext })
            };
            let src = cross(rec.src)?;
            let dest = cross(rec.dest)?;
            if src == dest {
                return Err(FleetError::Malformed {
                    vehicle: rec.id,
                    reason:  "source equals destination".into(),
                });
            }
            if rec.max_speed == 0 {
                return Err(FleetError::Malformed { vehicle: rec.id, reason: "zero max speed".into() });
            }
            vehicles.push(Vehicle {
                id:        rec.id,
                src,
                dest,
                max_speed: rec.max_speed,
                plan_time: Tick(rec.plan_time),
                priority:  rec.priority,
                preset:    rec.preset,
            });
        }

        let journeys = vec![Journey::default(); vehicles.len()];
        let states = vehicles.iter().map(|v| VehicleState::at_origin(v.src)).collect();
        Ok(Self { vehicles, journeys, states, index })
    }

    /// Bind each preset vehicle's departure time and route.
    ///
    /// Every preset vehicle needs exactly one record, every record must
    /// name a preset vehicle, and each route must be a legal walk from the
    /// vehicle's source to its destination.
    pub fn apply_presets(&mut self, presets: &[PresetRecord], network: &RoadNetwork) -> FleetResult<()> {
        for rec in presets {
            let id = self.id_of(rec.vehicle)?;
            let v = &self.vehicles[id.index()];
            let malformed = |reason: &str| FleetError::Malformed { vehicle: rec.vehicle, reason: reason.into() };
            if !v.preset {
                return Err(malformed("preset route given for a dynamic vehicle"));
            }
            if !self.journeys[id.index()].route.is_empty() {
                return Err(malformed("more than one preset route"));
            }
            let route = rec
                .roads
                .iter()
                .map(|&ext| {
                    network
                        .road_id(ext)
                        .map_err(|_| FleetError::UnknownRoad { vehicle: rec.vehicle, road: ext })
                })
                .collect::<FleetResult<Vec<RoadId>>>()?;
            if !is_walk(network, v.src, v.dest, &route) {
                return Err(malformed("preset route is not a walk from source to destination"));
            }
            let journey = &mut self.journeys[id.index()];
            journey.route = route;
            journey.start_time = Some(Tick(rec.start_time));
        }
        if let Some(v) = self
            .vehicles
            .iter()
            .zip(&self.journeys)
            .find(|(v, j)| v.preset && j.route.is_empty())
            .map(|(v, _)| v)
        {
            return Err(FleetError::Malformed { vehicle: v.id, reason: "preset vehicle without a route".into() });
        }
        Ok(())
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = VehicleId> + use<> {
        (0..self.vehicles.len() as u32).map(VehicleId)
    }

    /// Dense id of the vehicle with external id `external`.
    pub fn id_of(&self, external: u32) -> FleetResult<VehicleId> {
        self.index.get(&external).copied().ok_or(FleetError::UnknownVehicle(external))
    }

    #[inline]
    pub fn vehicle(&self, id: VehicleId) -> &Vehicle {
        &self.vehicles[id.index()]
    }

    #[inline]
    pub fn journey(&self, id: VehicleId) -> &Journey {
        &self.journeys[id.index()]
    }

    #[inline]
    pub fn journey_mut(&mut self, id: VehicleId) -> &mut Journey {
        &mut self.journeys[id.index()]
    }

    #[inline]
    pub fn state(&self, id: VehicleId) -> &VehicleState {
        &self.states[id.index()]
    }

    #[inline]
    pub fn state_mut(&mut self, id: VehicleId) -> &mut VehicleState {
        &mut self.states[id.index()]
    }

    /// Routing profile of one vehicle.
    #[inline]
    pub fn profile(&self, id: VehicleId) -> VehicleProfile {
        let v = self.vehicle(id);
        VehicleProfile::new(v.max_speed, v.priority)
    }

    /// Follows a fixed route: preset and not released.
    #[inline]
    pub fn follows_preset(&self, id: VehicleId) -> bool {
        self.vehicles[id.index()].preset && !self.journeys[id.index()].released
    }

    // ── Bulk operations ───────────────────────────────────────────────────

    /// Clear the per-tick transit state of every vehicle.
    pub fn reset_transit_states(&mut self) {
        for s in &mut self.states {
            s.reset_transit();
        }
    }

    pub fn count_at(&self, location: Location) -> usize {
        self.states.iter().filter(|s| s.location == location).count()
    }
}

/// `true` if `route` is a legal walk from `src` to `dest`.  Turning back
/// along the road just travelled is not legal.
pub fn is_walk(network: &RoadNetwork, src: CrossId, dest: CrossId, route: &[RoadId]) -> bool {
    if route.windows(2).any(|w| w[0] == w[1]) {
        return false;
    }
    let mut at = src;
    for &road in route {
        let r = network.road(road);
        if r.direction_from(at).is_none() {
            return false;
        }
        at = r.other_end(at);
    }
    !route.is_empty() && at == dest
}
