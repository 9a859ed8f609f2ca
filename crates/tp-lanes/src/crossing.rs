//! Moving vehicles between lane sets: departures from an origin and grants
//! at an intersection.

use tp_core::{CrossId, VehicleId};
use tp_fleet::{Location, NextHop, Transit, VehicleRegistry, VehicleState};
use tp_network::RoadNetwork;

use crate::error::invariant;
use crate::motion::speed_on;
use crate::{LaneResult, LaneSimulator};

/// Result of granting a waiting vehicle passage through an intersection.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CrossOutcome {
    /// Left the network at its destination.
    Arrived,
    /// Could not reach the next road this tick; moved up to the end of its
    /// current road and settled there.
    HeldAtEnd,
    /// Joined the next road.
    Entered,
    /// The target lane's tail is still waiting within reach.  Nothing moved.
    Blocked,
}

impl CrossOutcome {
    /// `true` if the vehicle stopped waiting.
    #[inline]
    pub fn resolved(self) -> bool {
        self != CrossOutcome::Blocked
    }
}

impl LaneSimulator {
    /// Let waiting head vehicle `v` pass through `cross`.
    pub fn cross_to(
        &mut self,
        network: &RoadNetwork,
        fleet:   &mut VehicleRegistry,
        v:       VehicleId,
        cross:   CrossId,
    ) -> LaneResult<CrossOutcome> {
        let s = *fleet.state(v);
        let road = network.road(s.road);

        let next = match s.next {
            NextHop::Undecided => return Err(invariant!("{v} reached {cross} without a next hop")),
            NextHop::Destination => {
                self.pop_head(v, &s)?;
                let st = fleet.state_mut(v);
                st.location = Location::Arrived;
                st.transit = Transit::Settled;
                return Ok(CrossOutcome::Arrived);
            }
            NextHop::Road(next) => next,
        };

        let next_road = network.road(next);
        let Some(dir) = next_road.direction_from(cross) else {
            return Err(invariant!("{v} cannot leave {cross} along {next}"));
        };
        let remain = road.length - s.offset;
        let speed = speed_on(network, fleet, next, v);
        let target = self.lanes(next, dir);

        let lane = match target.find_lane(fleet) {
            Some(lane) if remain < speed => lane,
            _ => {
                let st = fleet.state_mut(v);
                st.offset = road.length;
                st.transit = Transit::Settled;
                return Ok(CrossOutcome::HeldAtEnd);
            }
        };
        let reach = (speed - remain).min(next_road.length);
        let Some(offset) = target.entry_offset(lane, fleet, reach) else {
            return Ok(CrossOutcome::Blocked);
        };

        self.pop_head(v, &s)?;
        self.lanes_mut(next, dir).lanes[lane].push_back(v);
        let st = fleet.state_mut(v);
        st.road = next;
        st.dir = dir;
        st.lane = lane;
        st.offset = offset;
        st.from = cross;
        st.to = next_road.other_end(cross);
        st.hop += 1;
        st.next = NextHop::Undecided;
        st.transit = Transit::Settled;
        Ok(CrossOutcome::Entered)
    }

    /// Put origin vehicle `v` onto its first road.
    ///
    /// Returns `false`, changing nothing, if the first road has no room.
    pub fn depart(&mut self, network: &RoadNetwork, fleet: &mut VehicleRegistry, v: VehicleId) -> LaneResult<bool> {
        let s = *fleet.state(v);
        let src = fleet.vehicle(v).src;
        let NextHop::Road(first) = s.next else {
            return Err(invariant!("{v} departing without a first road"));
        };
        let road = network.road(first);
        let Some(dir) = road.direction_from(src) else {
            return Err(invariant!("{v} cannot leave its origin along {first}"));
        };
        let reach = speed_on(network, fleet, first, v).min(road.length);

        let target = self.lanes(first, dir);
        let Some(lane) = target.find_lane(fleet) else {
            return Ok(false);
        };
        let Some(offset) = target.entry_offset(lane, fleet, reach) else {
            return Ok(false);
        };

        self.lanes_mut(first, dir).lanes[lane].push_back(v);
        let st = fleet.state_mut(v);
        st.location = Location::OnRoad;
        st.road = first;
        st.dir = dir;
        st.lane = lane;
        st.offset = offset;
        st.from = src;
        st.to = road.other_end(src);
        st.hop = 0;
        st.next = NextHop::Undecided;
        st.transit = Transit::Settled;
        Ok(true)
    }

    /// Remove `v` from the front of the lane its state `s` names.
    fn pop_head(&mut self, v: VehicleId, s: &VehicleState) -> LaneResult<()> {
        let lane = self.lanes_mut(s.road, s.dir).lanes.get_mut(s.lane);
        match lane {
            Some(lane) if lane.front() == Some(&v) => {
                lane.pop_front();
                Ok(())
            }
            _ => Err(invariant!("{v} is not at the head of {} lane {}", s.road, s.lane)),
        }
    }
}
