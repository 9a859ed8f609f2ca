//! Road network representation and builder.
//!
//! # Data layout
//!
//! Roads and intersections are stored in ascending external-id order and
//! addressed by dense [`RoadId`] / [`CrossId`] indices.  Outgoing travel
//! options use a **Compressed Sparse Row (CSR)** layout: the options leaving
//! `CrossId c` occupy
//!
//! ```text
//! out_road[ out_start[c] .. out_start[c+1] ]
//! ```
//!
//! with parallel `out_dir` / `out_to` arrays, so Dijkstra's inner loop is a
//! contiguous scan.  A duplex road contributes one option at each end.
//!
//! Topology is immutable after [`RoadNetworkBuilder::build`].  The per-road
//! occupancy counters and penalty are the only mutable parts: the scheduler
//! rewrites occupancy every tick and feeds deadlock penalties back in.

use rustc_hash::FxHashMap;

use tp_core::{Approach, CrossId, Direction, RoadId, WeightConfig};

use crate::{NetworkError, NetworkResult, embedding};

// ── Input records ─────────────────────────────────────────────────────────────

/// One road as read from the road file.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadRecord {
    pub id:          u32,
    pub length:      u32,
    pub speed_limit: u32,
    pub lanes:       u32,
    pub from:        u32,
    pub to:          u32,
    pub duplex:      bool,
}

/// One intersection as read from the cross file.  Road slots are clockwise
/// from north; `None` marks an absent approach.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrossRecord {
    pub id:    u32,
    pub roads: [Option<u32>; 4],
}

// ── Road ──────────────────────────────────────────────────────────────────────

/// A one-way or duplex multi-lane road segment.
///
/// Per-direction arrays are indexed by [`Direction::index`].
#[derive(Clone, Debug)]
pub struct Road {
    /// External id from the input record.
    pub id:               u32,
    pub length:           u32,
    pub speed_limit:      u32,
    pub lanes:            u32,
    pub from:             CrossId,
    pub to:               CrossId,
    pub duplex:           bool,
    /// Dynamic vehicles on the road, refreshed every tick.
    pub occupancy:        [u32; 2],
    /// Preset-route vehicles on the road, refreshed every tick.
    pub preset_occupancy: [u32; 2],
    /// Deadlock penalty.  Grows on deadlock, decays linearly otherwise.
    pub penalty:          f64,
    pub key_road:         bool,
}

impl Road {
    /// Slots available in one direction (`length × lanes`).
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.length * self.lanes
    }

    #[inline]
    pub fn allows(&self, dir: Direction) -> bool {
        dir == Direction::Forward || self.duplex
    }

    /// Intersection a vehicle travelling `dir` enters the road from.
    #[inline]
    pub fn entry_cross(&self, dir: Direction) -> CrossId {
        match dir {
            Direction::Forward  => self.from,
            Direction::Backward => self.to,
        }
    }

    /// Intersection a vehicle travelling `dir` leaves the road at.
    #[inline]
    pub fn exit_cross(&self, dir: Direction) -> CrossId {
        match dir {
            Direction::Forward  => self.to,
            Direction::Backward => self.from,
        }
    }

    /// Direction of travel when leaving `cross` along this road, if legal.
    pub fn direction_from(&self, cross: CrossId) -> Option<Direction> {
        if self.from == cross {
            Some(Direction::Forward)
        } else if self.to == cross && self.duplex {
            Some(Direction::Backward)
        } else {
            None
        }
    }

    /// Direction of travel when arriving at `cross` along this road, if legal.
    pub fn direction_into(&self, cross: CrossId) -> Option<Direction> {
        if self.to == cross {
            Some(Direction::Forward)
        } else if self.from == cross && self.duplex {
            Some(Direction::Backward)
        } else {
            None
        }
    }

    /// The endpoint that is not `cross`.
    #[inline]
    pub fn other_end(&self, cross: CrossId) -> CrossId {
        if self.from == cross { self.to } else { self.from }
    }
}

// ── Intersection ──────────────────────────────────────────────────────────────

/// An intersection with up to four approaches and its embedded position.
#[derive(Clone, Debug)]
pub struct Intersection {
    /// External id from the input record.
    pub id:         u32,
    /// Incident roads, clockwise from north.
    pub approaches: [Option<RoadId>; 4],
    /// Present approaches in ascending road id; the arbitration visit order.
    pub by_road_id: Vec<RoadId>,
    pub x:          i32,
    pub y:          i32,
    /// On the extreme row or column of the embedding.
    pub boundary:   bool,
}

impl Intersection {
    #[inline]
    pub fn road_at(&self, slot: Approach) -> Option<RoadId> {
        self.approaches[slot.index()]
    }

    pub fn approach_of(&self, road: RoadId) -> Option<Approach> {
        self.approaches
            .iter()
            .position(|&r| r == Some(road))
            .map(Approach::from_index)
    }

    pub fn approach_count(&self) -> usize {
        self.approaches.iter().flatten().count()
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Road graph, embedding, and the live congestion counters fed into weights.
///
/// Do not construct directly; use [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    pub roads:   Vec<Road>,
    pub crosses: Vec<Intersection>,
    /// Weight model constants used by every routing query.
    pub weights: WeightConfig,

    road_index:  FxHashMap<u32, RoadId>,
    cross_index: FxHashMap<u32, CrossId>,
    /// Road joining an ordered cross pair in a legal direction (lowest id wins).
    pair_road:   FxHashMap<(CrossId, CrossId), RoadId>,

    // ── CSR travel options ────────────────────────────────────────────────
    out_start: Vec<u32>,
    out_road:  Vec<RoadId>,
    out_dir:   Vec<Direction>,
    out_to:    Vec<CrossId>,
}

impl RoadNetwork {
    // ── Dimensions and lookup ─────────────────────────────────────────────

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn cross_count(&self) -> usize {
        self.crosses.len()
    }

    #[inline]
    pub fn road(&self, id: RoadId) -> &Road {
        &self.roads[id.index()]
    }

    #[inline]
    pub fn cross(&self, id: CrossId) -> &Intersection {
        &self.crosses[id.index()]
    }

    /// Dense id of the road with external id `external`.
    pub fn road_id(&self, external: u32) -> NetworkResult<RoadId> {
        self.road_index
            .get(&external)
            .copied()
            .ok_or(NetworkError::UnknownRoad(external))
    }

    /// Dense id of the intersection with external id `external`.
    pub fn cross_id(&self, external: u32) -> NetworkResult<CrossId> {
        self.cross_index
            .get(&external)
            .copied()
            .ok_or(NetworkError::UnknownCross(external))
    }

    /// Road leading directly from `a` to `b`, if any.
    #[inline]
    pub fn pair_road(&self, a: CrossId, b: CrossId) -> Option<RoadId> {
        self.pair_road.get(&(a, b)).copied()
    }

    /// Every legal way out of `cross`: `(road, direction, far intersection)`.
    #[inline]
    pub fn out_roads(&self, cross: CrossId) -> impl Iterator<Item = (RoadId, Direction, CrossId)> + '_ {
        let start = self.out_start[cross.index()] as usize;
        let end   = self.out_start[cross.index() + 1] as usize;
        (start..end).map(|i| (self.out_road[i], self.out_dir[i], self.out_to[i]))
    }

    // ── Congestion state ──────────────────────────────────────────────────

    /// Overwrite one direction's occupancy counters.
    #[inline]
    pub fn set_occupancy(&mut self, road: RoadId, dir: Direction, dynamic: u32, preset: u32) {
        let r = &mut self.roads[road.index()];
        r.occupancy[dir.index()] = dynamic;
        r.preset_occupancy[dir.index()] = preset;
    }

    pub fn add_penalty(&mut self, road: RoadId, amount: f64) {
        self.roads[road.index()].penalty += amount;
    }

    /// Linear decay of every penalty toward zero.
    pub fn decay_penalties(&mut self, amount: f64) {
        for r in &mut self.roads {
            r.penalty = (r.penalty - amount).max(0.0);
        }
    }

    pub fn reset_penalties(&mut self) {
        for r in &mut self.roads {
            r.penalty = 0.0;
        }
    }

    pub fn key_roads(&self) -> impl Iterator<Item = RoadId> + '_ {
        self.roads
            .iter()
            .enumerate()
            .filter(|(_, r)| r.key_road)
            .map(|(i, _)| RoadId(i as u32))
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] from records, then call [`build`](Self::build).
///
/// Records may be added in any order.  `build()` sorts them by id, resolves
/// every cross-reference, lays out the CSR arrays, and embeds the
/// intersections on a grid.
///
/// # Example
///
/// ```
/// use tp_network::{CrossRecord, RoadNetworkBuilder, RoadRecord};
///
/// let mut b = RoadNetworkBuilder::new();
/// b.add_cross(CrossRecord { id: 1, roads: [None, Some(100), None, None] });
/// b.add_cross(CrossRecord { id: 2, roads: [None, None, None, Some(100)] });
/// b.add_road(RoadRecord {
///     id: 100, length: 6, speed_limit: 6, lanes: 1, from: 1, to: 2, duplex: true,
/// });
/// let net = b.build().unwrap();
/// assert_eq!(net.cross_count(), 2);
/// assert_eq!(net.out_roads(net.cross_id(2).unwrap()).count(), 1);
/// ```
pub struct RoadNetworkBuilder {
    roads:   Vec<RoadRecord>,
    crosses: Vec<CrossRecord>,
    weights: WeightConfig,
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self { roads: Vec::new(), crosses: Vec::new(), weights: WeightConfig::default() }
    }

    pub fn with_capacity(roads: usize, crosses: usize) -> Self {
        Self {
            roads:   Vec::with_capacity(roads),
            crosses: Vec::with_capacity(crosses),
            weights: WeightConfig::default(),
        }
    }

    pub fn add_road(&mut self, record: RoadRecord) -> &mut Self {
        self.roads.push(record);
        self
    }

    pub fn add_cross(&mut self, record: CrossRecord) -> &mut Self {
        self.crosses.push(record);
        self
    }

    /// Weight model constants.  Defaults to [`WeightConfig::default`].
    pub fn weights(&mut self, weights: WeightConfig) -> &mut Self {
        self.weights = weights;
        self
    }

    /// Validate the records and produce an immutable-topology network.
    ///
    /// Fails on duplicate ids, dangling references, zero-sized roads, roads
    /// not listed at both endpoints, or a network the embedding cannot reach
    /// in full.
    pub fn build(mut self) -> NetworkResult<RoadNetwork> {
        if self.crosses.is_empty() {
            return Err(NetworkError::Malformed("network has no intersections".into()));
        }
        self.roads.sort_by_key(|r| r.id);
        self.crosses.sort_by_key(|c| c.id);
        if let Some(w) = self.roads.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(NetworkError::Malformed(format!("duplicate road id {}", w[0].id)));
        }
        if let Some(w) = self.crosses.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(NetworkError::Malformed(format!("duplicate intersection id {}", w[0].id)));
        }

        let cross_index: FxHashMap<u32, CrossId> = self
            .crosses
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, CrossId(i as u32)))
            .collect();
        let road_index: FxHashMap<u32, RoadId> = self
            .roads
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id, RoadId(i as u32)))
            .collect();

        // ── Roads ─────────────────────────────────────────────────────────
        let mut roads = Vec::with_capacity(self.roads.len());
        for rec in &self.roads {
            if rec.length == 0 || rec.speed_limit == 0 || rec.lanes == 0 {
                return Err(NetworkError::Malformed(format!(
                    "road {} has zero length, speed limit, or lane count",
                    rec.id
                )));
            }
            let from = *cross_index.get(&rec.from).ok_or(NetworkError::UnknownCross(rec.from))?;
            let to   = *cross_index.get(&rec.to).ok_or(NetworkError::UnknownCross(rec.to))?;
            if from == to {
                return Err(NetworkError::Malformed(format!("road {} is a self-loop", rec.id)));
            }
            roads.push(Road {
                id:               rec.id,
                length:           rec.length,
                speed_limit:      rec.speed_limit,
                lanes:            rec.lanes,
                from,
                to,
                duplex:           rec.duplex,
                occupancy:        [0; 2],
                preset_occupancy: [0; 2],
                penalty:          0.0,
                key_road:         false,
            });
        }

        // ── Intersections ─────────────────────────────────────────────────
        let mut crosses = Vec::with_capacity(self.crosses.len());
        for (i, rec) in self.crosses.iter().enumerate() {
            let here = CrossId(i as u32);
            let mut approaches = [None; 4];
            for (slot, ext) in rec.roads.iter().enumerate() {
                let Some(ext) = *ext else { continue };
                let road = *road_index.get(&ext).ok_or(NetworkError::UnknownRoad(ext))?;
                let r = &roads[road.index()];
                if r.from != here && r.to != here {
                    return Err(NetworkError::Malformed(format!(
                        "intersection {} lists road {} which does not touch it",
                        rec.id, ext
                    )));
                }
                if approaches.contains(&Some(road)) {
                    return Err(NetworkError::Malformed(format!(
                        "intersection {} lists road {} twice",
                        rec.id, ext
                    )));
                }
                approaches[slot] = Some(road);
            }
            let mut by_road_id: Vec<RoadId> = approaches.iter().flatten().copied().collect();
            by_road_id.sort();
            crosses.push(Intersection {
                id: rec.id,
                approaches,
                by_road_id,
                x: 0,
                y: 0,
                boundary: false,
            });
        }
        for (i, r) in roads.iter().enumerate() {
            let road = RoadId(i as u32);
            for end in [r.from, r.to] {
                if crosses[end.index()].approach_of(road).is_none() {
                    return Err(NetworkError::Malformed(format!(
                        "road {} is not listed at intersection {}",
                        r.id,
                        crosses[end.index()].id
                    )));
                }
            }
        }

        // ── Pair map and CSR options ──────────────────────────────────────
        let mut pair_road = FxHashMap::default();
        for (i, r) in roads.iter().enumerate() {
            let road = RoadId(i as u32);
            pair_road.entry((r.from, r.to)).or_insert(road);
            if r.duplex {
                pair_road.entry((r.to, r.from)).or_insert(road);
            }
        }

        let mut out_start = Vec::with_capacity(crosses.len() + 1);
        let mut out_road  = Vec::new();
        let mut out_dir   = Vec::new();
        let mut out_to    = Vec::new();
        for (i, c) in crosses.iter().enumerate() {
            let here = CrossId(i as u32);
            out_start.push(out_road.len() as u32);
            for road in c.approaches.iter().flatten().copied() {
                let r = &roads[road.index()];
                if let Some(dir) = r.direction_from(here) {
                    out_road.push(road);
                    out_dir.push(dir);
                    out_to.push(r.other_end(here));
                }
            }
        }
        out_start.push(out_road.len() as u32);

        embedding::embed(&roads, &mut crosses)?;

        Ok(RoadNetwork {
            roads,
            crosses,
            weights: self.weights,
            road_index,
            cross_index,
            pair_road,
            out_start,
            out_road,
            out_dir,
            out_to,
        })
    }
}
