//! The motion pass: advance every vehicle that can move without crossing
//! an intersection.

use tp_core::{Direction, RoadId, VehicleId};
use tp_fleet::{NextHop, Transit, VehicleRegistry};
use tp_network::RoadNetwork;

use crate::LaneSimulator;

/// Speed of vehicle `v` on `road`.
#[inline]
pub fn speed_on(network: &RoadNetwork, fleet: &VehicleRegistry, road: RoadId, v: VehicleId) -> u32 {
    network.road(road).speed_limit.min(fleet.vehicle(v).max_speed)
}

impl LaneSimulator {
    /// Run the motion rule over one lane, front to back.
    ///
    /// Settled vehicles are skipped.  The head moves `speed` units unless
    /// that would take it past the road's end, in which case it starts
    /// waiting and `decide` is asked for its next hop.  Every other vehicle
    /// moves freely if it stays behind the one ahead, queues behind it if
    /// that one is waiting, or closes up to one unit behind it otherwise.
    ///
    /// `waiting` tracks the number of waiting vehicles in the tick.
    #[allow(clippy::too_many_arguments)]
    pub fn drive_lane<F, E>(
        &self,
        road:    RoadId,
        dir:     Direction,
        lane:    usize,
        network: &RoadNetwork,
        fleet:   &mut VehicleRegistry,
        waiting: &mut usize,
        decide:  &mut F,
    ) -> Result<(), E>
    where
        F: FnMut(&mut VehicleRegistry, VehicleId) -> Result<(), E>,
    {
        let length = network.road(road).length;
        // (offset, waiting) of the previous vehicle in the queue.
        let mut ahead: Option<(u32, bool)> = None;

        for &v in &self.lanes(road, dir).lanes[lane] {
            let speed = speed_on(network, fleet, road, v);
            let s = fleet.state_mut(v);
            if s.transit == Transit::Settled {
                ahead = Some((s.offset, false));
                continue;
            }
            let was_waiting = s.transit == Transit::Waiting;

            match ahead {
                None if s.offset + speed > length => {
                    if !was_waiting {
                        *waiting += 1;
                    }
                    s.transit = Transit::Waiting;
                    if s.next == NextHop::Undecided {
                        decide(fleet, v)?;
                    }
                }
                None => {
                    s.offset += speed;
                    s.transit = Transit::Settled;
                    if was_waiting {
                        *waiting -= 1;
                    }
                }
                Some((front, _)) if s.offset + speed < front => {
                    s.offset += speed;
                    s.transit = Transit::Settled;
                    if was_waiting {
                        *waiting -= 1;
                    }
                }
                Some((_, true)) => {
                    if !was_waiting {
                        *waiting += 1;
                    }
                    s.transit = Transit::Waiting;
                }
                Some((front, false)) => {
                    s.offset = front - 1;
                    s.transit = Transit::Settled;
                    if was_waiting {
                        *waiting -= 1;
                    }
                }
            }

            let s = fleet.state(v);
            ahead = Some((s.offset, s.is_waiting()));
        }
        Ok(())
    }

    /// Run [`drive_lane`](Self::drive_lane) over every lane of one road
    /// direction.
    pub fn drive_road<F, E>(
        &self,
        road:    RoadId,
        dir:     Direction,
        network: &RoadNetwork,
        fleet:   &mut VehicleRegistry,
        waiting: &mut usize,
        decide:  &mut F,
    ) -> Result<(), E>
    where
        F: FnMut(&mut VehicleRegistry, VehicleId) -> Result<(), E>,
    {
        for lane in 0..self.lanes(road, dir).lane_count() {
            self.drive_lane(road, dir, lane, network, fleet, waiting, decide)?;
        }
        Ok(())
    }

    /// Motion pass over the whole network: roads in ascending id, forward
    /// lanes before backward ones.
    pub fn drive_all<F, E>(
        &self,
        network: &RoadNetwork,
        fleet:   &mut VehicleRegistry,
        waiting: &mut usize,
        decide:  &mut F,
    ) -> Result<(), E>
    where
        F: FnMut(&mut VehicleRegistry, VehicleId) -> Result<(), E>,
    {
        for r in 0..self.road_count() {
            for dir in Direction::BOTH {
                self.drive_road(RoadId(r as u32), dir, network, fleet, waiting, decide)?;
            }
        }
        Ok(())
    }
}
