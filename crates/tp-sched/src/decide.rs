//! Next-hop decisions.

use tp_core::{CrossId, RoadId, VehicleId};
use tp_fleet::{Location, NextHop, VehicleRegistry};
use tp_network::{AllPairs, NetworkError, RoadNetwork, Router};

use crate::{SchedError, SchedResult};

/// Read-only routing inputs for one tick.
pub(crate) struct Decider<'a, R: Router> {
    pub network: &'a RoadNetwork,
    pub table:   &'a AllPairs,
    pub router:  &'a R,
}

impl<R: Router> Decider<'_, R> {
    /// Choose the next hop of `v` and record it in its state and route.
    ///
    /// Preset vehicles replay their route and priority vehicles follow one
    /// route computed on first use.  Everyone else takes the next hop of the
    /// all-pairs table, falling back to a single-pair search that excludes
    /// the current road when the table would send it straight back.
    ///
    /// Returns `false` only for a dynamic vehicle at its origin whose first
    /// road is congested; nothing is recorded then.
    pub fn decide(&self, fleet: &mut VehicleRegistry, v: VehicleId) -> SchedResult<bool> {
        let (src, dest, priority, preset) = {
            let veh = fleet.vehicle(v);
            (veh.src, veh.dest, veh.priority, veh.preset)
        };
        let released = fleet.journey(v).released;
        let s = *fleet.state(v);

        if preset && !released {
            fleet.state_mut(v).next = hop_after(fleet, v)?;
            return Ok(true);
        }

        if priority {
            if fleet.journey(v).route.is_empty() {
                let route = self.router.route(self.network, src, dest, fleet.profile(v), None)?;
                fleet.journey_mut(v).route = route.roads;
            }
            fleet.state_mut(v).next = hop_after(fleet, v)?;
            return Ok(true);
        }

        if s.location == Location::OnRoad && s.to == dest {
            fleet.state_mut(v).next = NextHop::Destination;
            return Ok(true);
        }

        // Failed to enter the road chosen last time: insist on it.
        if let Some(&last) = fleet.journey(v).route.last() {
            if s.road != last {
                fleet.state_mut(v).next = NextHop::Road(last);
                return Ok(true);
            }
        }

        let next = if s.location == Location::AtOrigin {
            let road = self.table.next_road(self.network, src, dest)?;
            if self.network.is_congested(road) && !released {
                return Ok(false);
            }
            road
        } else {
            let road = self.onward(fleet, v, s.from, s.to, s.road, dest)?;
            if road == s.road {
                return Err(SchedError::Invariant(format!("{v} told to turn back along {road}")));
            }
            road
        };

        fleet.journey_mut(v).route.push(next);
        fleet.state_mut(v).next = NextHop::Road(next);
        Ok(true)
    }

    /// [`decide`](Self::decide) for a vehicle at the end of its road, where
    /// a decision is always possible.
    pub fn decide_waiting(&self, fleet: &mut VehicleRegistry, v: VehicleId) -> SchedResult<()> {
        if self.decide(fleet, v)? {
            Ok(())
        } else {
            Err(SchedError::Invariant(format!("{v} left without a next hop on {}", fleet.state(v).road)))
        }
    }

    fn onward(
        &self,
        fleet: &VehicleRegistry,
        v:     VehicleId,
        from:  CrossId,
        at:    CrossId,
        road:  RoadId,
        dest:  CrossId,
    ) -> SchedResult<RoadId> {
        let hop = self.table.next(at, dest);
        if hop == from {
            log::trace!("{v}: table turns back at {at}, searching around {road}");
            return Ok(self.router.next_hop(self.network, at, dest, fleet.profile(v), Some(road))?);
        }
        self.network
            .pair_road(at, hop)
            .ok_or_else(|| NetworkError::NoRoute { from: at, to: dest }.into())
    }
}

/// The route entry after the vehicle's current position.
fn hop_after(fleet: &VehicleRegistry, v: VehicleId) -> SchedResult<NextHop> {
    let route = &fleet.journey(v).route;
    let s = fleet.state(v);
    let next = match s.location {
        Location::AtOrigin => route.first().copied().map(NextHop::Road),
        Location::OnRoad if s.hop + 1 == route.len() => Some(NextHop::Destination),
        Location::OnRoad => route.get(s.hop + 1).copied().map(NextHop::Road),
        Location::Arrived => None,
    };
    next.ok_or_else(|| SchedError::Invariant(format!("{v} has no route entry after hop {}", s.hop)))
}
