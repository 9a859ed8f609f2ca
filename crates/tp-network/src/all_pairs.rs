//! All-pairs shortest paths (Floyd-Warshall) over the vehicle-independent
//! edge weights.
//!
//! Recomputed once per tick so that regular vehicles can look up their next
//! hop in O(1) instead of running a single-pair search per decision.
//!
//! # Layout
//!
//! `dist` and `next` are flat row-major `n × n` arrays indexed by `CrossId`.
//! `next[i][j]` is the intersection to move to first on the way from `i` to
//! `j`; `next[i][i] == i` and `dist[i][i] == 0`.

use tp_core::{CrossId, RoadId};

use crate::{NetworkError, NetworkResult, RoadNetwork, VehicleProfile};

/// Distance and next-hop tables for every ordered intersection pair.
#[derive(Clone, Debug, PartialEq)]
pub struct AllPairs {
    n:    usize,
    dist: Vec<f64>,
    next: Vec<CrossId>,
}

impl AllPairs {
    /// Run Floyd-Warshall on the current weights.
    ///
    /// Fails with [`NetworkError::NoRoute`] if any pair is unreachable.
    pub fn compute(network: &RoadNetwork) -> NetworkResult<AllPairs> {
        let n = network.cross_count();
        let mut dist = vec![f64::INFINITY; n * n];
        let mut next = vec![CrossId::INVALID; n * n];

        for i in 0..n {
            let here = CrossId(i as u32);
            dist[i * n + i] = 0.0;
            next[i * n + i] = here;
            for (road, dir, to) in network.out_roads(here) {
                let w = network.edge_weight(road, dir, VehicleProfile::TABLE)?;
                let cell = i * n + to.index();
                if w < dist[cell] {
                    dist[cell] = w;
                    next[cell] = to;
                }
            }
        }

        for k in 0..n {
            relax(&mut dist, &mut next, n, k);
        }

        if let Some(cell) = dist.iter().position(|d| !d.is_finite()) {
            return Err(NetworkError::NoRoute {
                from: CrossId((cell / n) as u32),
                to:   CrossId((cell % n) as u32),
            });
        }
        Ok(AllPairs { n, dist, next })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn dist(&self, from: CrossId, to: CrossId) -> f64 {
        self.dist[from.index() * self.n + to.index()]
    }

    /// First intersection after `from` on the way to `to`.
    #[inline]
    pub fn next(&self, from: CrossId, to: CrossId) -> CrossId {
        self.next[from.index() * self.n + to.index()]
    }

    /// Road leading from `from` toward `to` according to the table.
    pub fn next_road(&self, network: &RoadNetwork, from: CrossId, to: CrossId) -> NetworkResult<RoadId> {
        let hop = self.next(from, to);
        if hop == from {
            return Err(NetworkError::NoRoute { from, to });
        }
        network.pair_road(from, hop).ok_or(NetworkError::NoRoute { from, to })
    }
}

/// One pivot step.  Row `k` and column `k` are invariant during step `k`, so
/// rows may be relaxed independently.
#[cfg(not(feature = "parallel"))]
fn relax(dist: &mut [f64], next: &mut [CrossId], n: usize, k: usize) {
    let row_k: Vec<f64> = dist[k * n..(k + 1) * n].to_vec();
    for (drow, nrow) in dist.chunks_mut(n).zip(next.chunks_mut(n)) {
        relax_row(drow, nrow, &row_k, k);
    }
}

#[cfg(feature = "parallel")]
fn relax(dist: &mut [f64], next: &mut [CrossId], n: usize, k: usize) {
    use rayon::prelude::*;

    let row_k: Vec<f64> = dist[k * n..(k + 1) * n].to_vec();
    dist.par_chunks_mut(n)
        .zip(next.par_chunks_mut(n))
        .for_each(|(drow, nrow)| relax_row(drow, nrow, &row_k, k));
}

#[inline]
fn relax_row(drow: &mut [f64], nrow: &mut [CrossId], row_k: &[f64], k: usize) {
    let dik = drow[k];
    if !dik.is_finite() {
        return;
    }
    let via = nrow[k];
    for (j, &dkj) in row_k.iter().enumerate() {
        let cand = dik + dkj;
        if cand < drow[j] {
            drow[j] = cand;
            nrow[j] = via;
        }
    }
}

// ── Key roads ─────────────────────────────────────────────────────────────────

impl RoadNetwork {
    /// Flag the roads most often used as a first hop in `table`.
    ///
    /// The top `key_road_fraction` of roads by first-hop frequency (ties by
    /// ascending id) get `key_road = true`; all others are cleared.  Returns
    /// the number flagged.
    pub fn mark_key_roads(&mut self, table: &AllPairs) -> usize {
        let n = self.cross_count();
        let mut uses = vec![0u64; self.road_count()];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let (a, b) = (CrossId(i as u32), CrossId(j as u32));
                if let Ok(road) = table.next_road(self, a, b) {
                    uses[road.index()] += 1;
                }
            }
        }
        let mut order: Vec<usize> = (0..self.road_count()).collect();
        order.sort_by(|&a, &b| uses[b].cmp(&uses[a]).then(a.cmp(&b)));

        let count = (self.road_count() as f64 * self.weights.key_road_fraction).floor() as usize;
        for r in &mut self.roads {
            r.key_road = false;
        }
        for &i in order.iter().take(count) {
            self.roads[i].key_road = true;
        }
        count
    }
}
