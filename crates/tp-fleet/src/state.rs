//! Per-vehicle placement and per-tick transit state.

use tp_core::{CrossId, Direction, RoadId};

/// Where a vehicle is at the macro level.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Location {
    AtOrigin,
    OnRoad,
    Arrived,
}

/// Micro state within one tick.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Transit {
    /// Not yet processed this tick.
    Ready,
    /// Blocked by the road end or a waiting vehicle ahead; needs a grant.
    Waiting,
    /// Done moving this tick.
    Settled,
}

/// The road a vehicle will take at the end of its current road.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum NextHop {
    Undecided,
    Road(RoadId),
    /// Leave the network at the end of the current road.
    Destination,
}

/// Placement of one vehicle.
///
/// `transit` and `next` are per-tick and cleared by
/// [`reset_transit`](Self::reset_transit); the rest persists across ticks.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct VehicleState {
    pub location: Location,
    pub transit:  Transit,
    /// Entry intersection of the current road.
    pub from:     CrossId,
    /// Exit intersection of the current road.
    pub to:       CrossId,
    pub road:     RoadId,
    pub dir:      Direction,
    /// Index of `road` in the journey's route.
    pub hop:      usize,
    /// Distance travelled along the current road from its entry.
    pub offset:   u32,
    pub lane:     usize,
    pub next:     NextHop,
}

impl VehicleState {
    pub fn at_origin(src: CrossId) -> Self {
        Self {
            location: Location::AtOrigin,
            transit:  Transit::Ready,
            from:     src,
            to:       CrossId::INVALID,
            road:     RoadId::INVALID,
            dir:      Direction::Forward,
            hop:      0,
            offset:   0,
            lane:     0,
            next:     NextHop::Undecided,
        }
    }

    #[inline]
    pub fn reset_transit(&mut self) {
        self.transit = Transit::Ready;
        self.next = NextHop::Undecided;
    }

    #[inline]
    pub fn is_waiting(&self) -> bool {
        self.transit == Transit::Waiting
    }

    #[inline]
    pub fn is_settled(&self) -> bool {
        self.transit == Transit::Settled
    }
}
