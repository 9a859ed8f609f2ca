//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! `tp-sched` calls routing via the [`Router`] trait, so alternative search
//! strategies (A*, bidirectional search) can be swapped in without touching
//! the scheduler.  The default [`DijkstraRouter`] is a binary-heap Dijkstra
//! over the live edge weights.
//!
//! # Cost units
//!
//! Costs are `f64` weights from [`RoadNetwork::edge_weight`]: ticks of free
//! travel plus dimensionless congestion terms.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use tp_core::{CrossId, RoadId};

use crate::{NetworkError, NetworkResult, RoadNetwork, VehicleProfile};

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query: roads to traverse in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub roads: Vec<RoadId>,
    pub cost:  f64,
}

impl Route {
    /// `true` if the source and destination are the same intersection.
    pub fn is_trivial(&self) -> bool {
        self.roads.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable single-pair routing engine.
///
/// Implementations must be `Send + Sync` so a network and its router can be
/// shared across threads by embedding applications.
pub trait Router: Send + Sync {
    /// Cheapest route from `from` to `to` for `profile`.
    ///
    /// `excluded`, when set, may not be taken as the first road out of
    /// `from`.  It is legal everywhere else on the path.
    fn route(
        &self,
        network:  &RoadNetwork,
        from:     CrossId,
        to:       CrossId,
        profile:  VehicleProfile,
        excluded: Option<RoadId>,
    ) -> NetworkResult<Route>;

    /// First road of [`route`](Self::route).
    fn next_hop(
        &self,
        network:  &RoadNetwork,
        from:     CrossId,
        to:       CrossId,
        profile:  VehicleProfile,
        excluded: Option<RoadId>,
    ) -> NetworkResult<RoadId> {
        self.route(network, from, to, profile, excluded)?
            .roads
            .first()
            .copied()
            .ok_or(NetworkError::NoRoute { from, to })
    }
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra over the CSR travel options.
#[derive(Clone, Copy, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(
        &self,
        network:  &RoadNetwork,
        from:     CrossId,
        to:       CrossId,
        profile:  VehicleProfile,
        excluded: Option<RoadId>,
    ) -> NetworkResult<Route> {
        dijkstra(network, from, to, profile, excluded)
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Heap key: `f64` with a total order.
#[derive(Copy, Clone, PartialEq, Debug)]
struct Cost(f64);

impl Eq for Cost {}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn dijkstra(
    network:  &RoadNetwork,
    from:     CrossId,
    to:       CrossId,
    profile:  VehicleProfile,
    excluded: Option<RoadId>,
) -> NetworkResult<Route> {
    if from == to {
        return Ok(Route { roads: vec![], cost: 0.0 });
    }

    let n = network.cross_count();
    let mut dist      = vec![f64::INFINITY; n];
    // prev_road[v] = road that reached v; RoadId::INVALID for unreached nodes.
    let mut prev_road = vec![RoadId::INVALID; n];

    dist[from.index()] = 0.0;

    // Secondary key CrossId ensures deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(Cost, CrossId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), from)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(network, &prev_road, from, to, cost));
        }

        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }

        for (road, dir, neighbor) in network.out_roads(node) {
            if node == from && Some(road) == excluded {
                continue;
            }
            let new_cost = cost + network.edge_weight(road, dir, profile)?;
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_road[neighbor.index()] = road;
                heap.push(Reverse((Cost(new_cost), neighbor)));
            }
        }
    }

    Err(NetworkError::NoRoute { from, to })
}

fn reconstruct(network: &RoadNetwork, prev_road: &[RoadId], from: CrossId, to: CrossId, cost: f64) -> Route {
    let mut roads = Vec::new();
    let mut cur = to;
    while cur != from {
        let r = prev_road[cur.index()];
        if r == RoadId::INVALID {
            break;
        }
        roads.push(r);
        cur = network.road(r).other_end(cur);
    }
    roads.reverse();
    Route { roads, cost }
}
