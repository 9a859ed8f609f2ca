//! Congestion-aware edge weight model.
//!
//! The weight of travelling road `r` in direction `dir` is
//!
//! ```text
//! base    = length / min(speed_limit, vehicle max_speed)
//! fill    = (occupancy + preset_occupancy) / (length × lanes)
//! weight  = base + k × fill + penalty
//! ```
//!
//! where `k` starts at `congestion_k` and is scaled by the kind of the
//! intersection the road leads into and by how jammed the road is.  Priority
//! vehicles use `base + priority_occupancy_k × occupancy / capacity` and so
//! ignore penalties and preset traffic.  The all-pairs table uses the road's
//! speed limit alone (no vehicle) and always the regular form.

use tp_core::{CrossId, Direction, RoadId};

use crate::{NetworkError, NetworkResult, RoadNetwork};

/// Shape of an intersection as seen from one arriving road.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum IntersectionKind {
    Interior,
    /// Exactly three approaches, and the slot straight ahead is missing.
    Merge,
    /// On the extreme row or column of the embedding.
    Boundary,
}

/// The vehicle attributes the weight model depends on.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct VehicleProfile {
    /// `None` means "use the road's speed limit".
    pub max_speed: Option<u32>,
    pub priority:  bool,
}

impl VehicleProfile {
    /// Vehicle-independent profile used for the all-pairs table.
    pub const TABLE: VehicleProfile = VehicleProfile { max_speed: None, priority: false };

    pub fn new(max_speed: u32, priority: bool) -> Self {
        Self { max_speed: Some(max_speed), priority }
    }
}

impl RoadNetwork {
    /// Classify `cross` for a vehicle arriving on `arriving`.
    pub fn intersection_kind(&self, cross: CrossId, arriving: RoadId) -> IntersectionKind {
        let c = self.cross(cross);
        if c.boundary {
            return IntersectionKind::Boundary;
        }
        match c.approach_of(arriving) {
            Some(slot) if c.approach_count() == 3 && c.road_at(slot.opposite()).is_none() => {
                IntersectionKind::Merge
            }
            _ => IntersectionKind::Interior,
        }
    }

    /// `true` once the road's accumulated penalty exceeds the threshold.
    #[inline]
    pub fn is_congested(&self, road: RoadId) -> bool {
        self.road(road).penalty > self.weights.congestion_threshold
    }

    /// Weight of travelling `road` in `dir` for `profile`.
    ///
    /// Always finite and non-negative; anything else is an
    /// [`NetworkError::InvalidWeight`].
    pub fn edge_weight(&self, road: RoadId, dir: Direction, profile: VehicleProfile) -> NetworkResult<f64> {
        let r = self.road(road);
        let w = &self.weights;
        let invalid = |reason: String| NetworkError::InvalidWeight { road, reason };

        if r.length == 0 {
            return Err(invalid("zero length".into()));
        }
        if !(w.congestion_k.is_finite() && w.congestion_k > 0.0) {
            return Err(invalid(format!("non-positive congestion coefficient {}", w.congestion_k)));
        }
        let speed = profile.max_speed.map_or(r.speed_limit, |v| v.min(r.speed_limit));
        if speed == 0 {
            return Err(invalid("zero effective speed".into()));
        }

        let length   = r.length as f64;
        let capacity = r.capacity() as f64;
        let dynamic  = r.occupancy[dir.index()] as f64;
        let preset   = r.preset_occupancy[dir.index()] as f64;
        let base     = length / speed as f64;

        let weight = if profile.priority {
            base + w.priority_occupancy_k * dynamic / capacity
        } else {
            let mut k = w.congestion_k;
            let exit = r.exit_cross(dir);
            if self.intersection_kind(exit, road) == IntersectionKind::Merge {
                k *= w.merge_factor;
                if dynamic / capacity > w.occupancy_threshold {
                    k *= w.merge_jam_factor;
                }
            } else if (dynamic + preset) / capacity > w.occupancy_threshold {
                k *= w.preset_jam_factor;
            } else if dynamic / capacity > w.occupancy_threshold {
                k *= w.jam_factor;
            }
            if !(k.is_finite() && k > 0.0) {
                return Err(invalid(format!("non-positive congestion coefficient {k}")));
            }
            base + k * (dynamic + preset) / capacity + r.penalty
        };

        if weight.is_finite() && weight >= 0.0 {
            Ok(weight)
        } else {
            Err(invalid(format!("computed weight {weight}")))
        }
    }
}
