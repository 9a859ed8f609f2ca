//! Intersection arbitration primitives: which vehicle of a lane set is the
//! candidate for passage, and whether a candidate must yield.
//!
//! Turns are expressed as approach offsets from the arriving slot, clockwise:
//! `1` is a left turn, `2` straight through, `3` a right turn.

use tp_core::{CrossId, RoadId, VehicleId};
use tp_fleet::{NextHop, VehicleRegistry, VehicleState};
use tp_network::{Intersection, RoadNetwork};

use crate::error::invariant;
use crate::{LaneResult, LaneSet, LaneSimulator};

/// `YIELD_TABLE[own][other]`: a candidate turning by `own` yields to a
/// candidate arriving `other` slots clockwise from it, provided both are
/// bound for the same exit.
///
/// A left turn yields to straight traffic from the right-hand approach.  A
/// right turn yields to straight traffic from the left-hand approach and to
/// left turns from the opposite approach.  Straight traffic never yields.
pub const YIELD_TABLE: [[bool; 4]; 4] = [
    [false, false, false, false],
    [false, false, false, true],
    [false, false, false, false],
    [false, true, true, false],
];

/// Exit road of a vehicle at `cross`, counting "leave the network" as the
/// straight-through road.  `None` if undecided, or if the straight slot is
/// empty.
pub fn resolved_exit(cross: &Intersection, s: &VehicleState) -> Option<RoadId> {
    match s.next {
        NextHop::Road(r) => Some(r),
        NextHop::Destination => cross
            .approach_of(s.road)
            .and_then(|a| cross.road_at(a.opposite())),
        NextHop::Undecided => None,
    }
}

impl LaneSet {
    /// The lane head eligible for passage: waiting, furthest along, with
    /// priority vehicles beating any non-priority one.
    pub fn candidate(&self, fleet: &VehicleRegistry) -> Option<VehicleId> {
        let mut best: Option<(VehicleId, u32, bool)> = None;
        for lane in &self.lanes {
            let Some(&head) = lane.front() else { continue };
            let s = fleet.state(head);
            if !s.is_waiting() {
                continue;
            }
            let priority = fleet.vehicle(head).priority;
            let better = match best {
                None => true,
                Some((_, offset, true)) => priority && s.offset > offset,
                Some((_, offset, false)) => priority || s.offset > offset,
            };
            if better {
                best = Some((head, s.offset, priority));
            }
        }
        best.map(|(v, _, _)| v)
    }
}

impl LaneSimulator {
    /// Candidate of the lanes on `road` heading into `cross`, if any.
    pub fn candidate_into(&self, network: &RoadNetwork, fleet: &VehicleRegistry, road: RoadId, cross: CrossId) -> Option<VehicleId> {
        let dir = network.road(road).direction_into(cross)?;
        self.lanes(road, dir).candidate(fleet)
    }

    /// `true` if candidate `v` at `cross` must yield to the candidate of any
    /// other approach.
    pub fn yields(&self, network: &RoadNetwork, fleet: &VehicleRegistry, cross: CrossId, v: VehicleId) -> LaneResult<bool> {
        let x = network.cross(cross);
        let own = fleet.state(v);
        let own_priority = fleet.vehicle(v).priority;
        let Some(slot) = x.approach_of(own.road) else {
            return Err(invariant!("{v} waits at {cross} on a road that does not touch it"));
        };
        if own.next == NextHop::Undecided {
            return Err(invariant!("{v} reached arbitration at {cross} without a next hop"));
        }
        let own_exit = resolved_exit(x, own);

        // Turn of `v`; `None` for straight through or leaving the network.
        let own_turn = match own.next {
            NextHop::Road(exit) => {
                let Some(exit_slot) = x.approach_of(exit) else {
                    return Err(invariant!("{v} exits {cross} along {exit}, which does not touch it"));
                };
                match slot.offset_to(exit_slot) {
                    0 => return Err(invariant!("{v} turns back along {exit} at {cross}")),
                    2 => None,
                    turn => Some(turn),
                }
            }
            _ => None,
        };

        for step in 1..4 {
            let other_slot = slot.rotate(step);
            let Some(other_road) = x.road_at(other_slot) else { continue };
            let Some(other) = self.candidate_into(network, fleet, other_road, cross) else { continue };
            let os = fleet.state(other);
            if os.next == NextHop::Undecided {
                return Err(invariant!("{other} reached arbitration at {cross} without a next hop"));
            }
            let other_priority = fleet.vehicle(other).priority;
            let other_exit = resolved_exit(x, os);

            let conflict = match (own_priority, other_priority) {
                (true, false) => false,
                (false, true) => own_exit.is_some() && own_exit == other_exit,
                _ => own_turn.is_some_and(|turn| {
                    YIELD_TABLE[turn][step] && other_exit == own_exit
                }),
            };
            if conflict {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
