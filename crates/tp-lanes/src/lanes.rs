//! Per-road, per-direction lane queues.

use std::collections::VecDeque;

use tp_core::{Direction, RoadId, VehicleId};
use tp_fleet::{Location, VehicleRegistry};
use tp_network::RoadNetwork;

use crate::LaneResult;
use crate::error::invariant;

// ── LaneSet ───────────────────────────────────────────────────────────────────

/// The lanes of one road in one direction.
///
/// Each queue is ordered exit-first: vehicles join at the back on entry and
/// leave from the front at the exit intersection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LaneSet {
    pub lanes: Vec<VecDeque<VehicleId>>,
}

impl LaneSet {
    pub fn new(lanes: usize) -> Self {
        Self { lanes: vec![VecDeque::new(); lanes] }
    }

    #[inline]
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Number of vehicles across all lanes.
    pub fn vehicle_count(&self) -> usize {
        self.lanes.iter().map(VecDeque::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.lanes.iter().flatten().copied()
    }

    /// First lane a newcomer may try: empty, or ending in a waiting vehicle,
    /// or ending in a settled vehicle with room behind it.
    pub fn find_lane(&self, fleet: &VehicleRegistry) -> Option<usize> {
        self.lanes.iter().position(|lane| match lane.back() {
            None => true,
            Some(&tail) => {
                let s = fleet.state(tail);
                s.is_waiting() || (s.is_settled() && s.offset > 1)
            }
        })
    }

    /// Offset a newcomer that can travel `reach` units would take in `lane`.
    ///
    /// `None` if the lane's tail is still waiting and sits within reach: the
    /// newcomer cannot know where it will end up and must wait itself.
    pub fn entry_offset(&self, lane: usize, fleet: &VehicleRegistry, reach: u32) -> Option<u32> {
        match self.lanes[lane].back() {
            None => Some(reach),
            Some(&tail) => {
                let s = fleet.state(tail);
                if s.is_waiting() && s.offset <= reach {
                    None
                } else {
                    Some(reach.min(s.offset.saturating_sub(1)))
                }
            }
        }
    }
}

// ── LaneSimulator ─────────────────────────────────────────────────────────────

/// All lane queues of the network.
///
/// `sets[road]` holds the forward and backward [`LaneSet`]s indexed by
/// [`Direction::index`]; a one-way road has an empty backward set.  The
/// whole structure is `Clone` so that snapshots can copy it wholesale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaneSimulator {
    sets: Vec<[LaneSet; 2]>,
}

impl LaneSimulator {
    pub fn new(network: &RoadNetwork) -> Self {
        let sets = network
            .roads
            .iter()
            .map(|r| {
                let n = r.lanes as usize;
                [LaneSet::new(n), LaneSet::new(if r.duplex { n } else { 0 })]
            })
            .collect();
        Self { sets }
    }

    #[inline]
    pub fn lanes(&self, road: RoadId, dir: Direction) -> &LaneSet {
        &self.sets[road.index()][dir.index()]
    }

    #[inline]
    pub fn lanes_mut(&mut self, road: RoadId, dir: Direction) -> &mut LaneSet {
        &mut self.sets[road.index()][dir.index()]
    }

    /// Vehicles on `road` travelling in `dir`.
    #[inline]
    pub fn count(&self, road: RoadId, dir: Direction) -> usize {
        self.lanes(road, dir).vehicle_count()
    }

    pub fn road_count(&self) -> usize {
        self.sets.len()
    }

    /// Every vehicle currently on any road.
    pub fn vehicles(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.sets.iter().flatten().flat_map(LaneSet::iter)
    }

    /// Verify queue order and queue/state agreement for every lane.
    ///
    /// Offsets must strictly decrease from the front of each queue, stay
    /// within the road's length, and every queued vehicle's state must name
    /// the road, direction and lane it is queued in.
    pub fn check_invariants(&self, network: &RoadNetwork, fleet: &VehicleRegistry) -> LaneResult<()> {
        for (r, pair) in self.sets.iter().enumerate() {
            let road = RoadId(r as u32);
            let length = network.road(road).length;
            for dir in Direction::BOTH {
                for (li, lane) in pair[dir.index()].lanes.iter().enumerate() {
                    let mut ahead: Option<u32> = None;
                    for &v in lane {
                        let s = fleet.state(v);
                        if s.location != Location::OnRoad || s.road != road || s.dir != dir || s.lane != li {
                            return Err(invariant!(
                                "{v} queued on {road} {dir:?} lane {li} but placed on {} {:?} lane {}",
                                s.road,
                                s.dir,
                                s.lane
                            ));
                        }
                        if s.offset > length {
                            return Err(invariant!("{v} at offset {} beyond length {length} of {road}", s.offset));
                        }
                        if ahead.is_some_and(|a| s.offset >= a) {
                            return Err(invariant!("{v} at offset {} overlaps the vehicle ahead on {road}", s.offset));
                        }
                        ahead = Some(s.offset);
                    }
                }
            }
        }
        Ok(())
    }
}
