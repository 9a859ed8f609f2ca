//! Planner tuning configuration.
//!
//! Every empirically tuned constant of the planner lives here with its
//! default value, so experiments can override them from a JSON file (with the
//! `serde` feature) instead of editing code.  Missing fields in a partial
//! override fall back to the defaults.

use crate::{TpError, TpResult};

// ── PlannerConfig ─────────────────────────────────────────────────────────────

/// Top-level planner configuration.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    pub weights:     WeightConfig,
    pub admission:   AdmissionConfig,
    pub recovery:    RecoveryConfig,
    pub calibration: CalibrationConfig,
}

impl PlannerConfig {
    /// Reject values that would make weights non-finite, budgets incoherent,
    /// or the recovery loop unable to make progress.
    pub fn validate(&self) -> TpResult<()> {
        self.weights.validate()?;
        self.admission.validate()?;
        self.recovery.validate()?;
        self.calibration.validate()
    }
}

fn check(ok: bool, msg: impl FnOnce() -> String) -> TpResult<()> {
    if ok { Ok(()) } else { Err(TpError::Config(msg())) }
}

fn finite_non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}

// ── WeightConfig ──────────────────────────────────────────────────────────────

/// Constants of the congestion-aware edge weight model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WeightConfig {
    /// Base congestion coefficient `k`.
    pub congestion_k: f64,
    /// Occupancy fraction above which a road counts as jammed.
    pub occupancy_threshold: f64,
    /// Multiplier on `k` when the road leads into a merge intersection.
    pub merge_factor: f64,
    /// Extra multiplier at a merge when the road is jammed.
    pub merge_jam_factor: f64,
    /// Multiplier when dynamic plus preset occupancy is jammed.
    pub preset_jam_factor: f64,
    /// Multiplier when dynamic occupancy alone is jammed.
    pub jam_factor: f64,
    /// Occupancy coefficient of the simplified priority-class weight.
    pub priority_occupancy_k: f64,
    /// Penalty above which a road is congested.
    pub congestion_threshold: f64,
    /// Share of roads flagged as key roads after the first all-pairs refresh.
    pub key_road_fraction: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            congestion_k:         100.0,
            occupancy_threshold:  0.8,
            merge_factor:         2.0,
            merge_jam_factor:     4.0,
            preset_jam_factor:    6.0,
            jam_factor:           4.0,
            priority_occupancy_k: 10.0,
            congestion_threshold: 15.0,
            key_road_fraction:    0.1,
        }
    }
}

impl WeightConfig {
    fn validate(&self) -> TpResult<()> {
        // Factors multiply `k`, which must stay positive.
        for (name, v) in [
            ("congestion_k",      self.congestion_k),
            ("merge_factor",      self.merge_factor),
            ("merge_jam_factor",  self.merge_jam_factor),
            ("preset_jam_factor", self.preset_jam_factor),
            ("jam_factor",        self.jam_factor),
        ] {
            check(v.is_finite() && v > 0.0, || format!("{name} must be finite and > 0, got {v}"))?;
        }
        for (name, v) in [
            ("occupancy_threshold",  self.occupancy_threshold),
            ("priority_occupancy_k", self.priority_occupancy_k),
            ("congestion_threshold", self.congestion_threshold),
        ] {
            check(finite_non_negative(v), || format!("{name} must be finite and >= 0, got {v}"))?;
        }
        check((0.0..=1.0).contains(&self.key_road_fraction), || {
            format!("key_road_fraction must lie in [0, 1], got {}", self.key_road_fraction)
        })
    }
}

// ── AdmissionConfig ───────────────────────────────────────────────────────────

/// Backpressure on how many vehicles may be in transit at once.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AdmissionConfig {
    /// Hard ceiling of the admission budget.
    pub ceiling: u32,
    /// Budget at tick 0.
    pub initial_budget: u32,
    /// Budget increment per clean tick at start.
    pub initial_stride: u32,
    /// Stride increase at every snapshot tick.
    pub stride_growth: u32,
    /// Stride right after a deadlock.
    pub stride_after_deadlock: u32,
    /// Budget reduction applied on top of the retry division after a deadlock.
    pub deadlock_cut: u32,
    /// Budget never drops below this after a deadlock.
    pub budget_floor: u32,
    /// Priority vehicles in transit above which regular traffic is throttled.
    pub priority_reserve_threshold: u32,
    /// Origin lists smaller than this are re-sorted by ascending max speed once.
    pub speed_sort_limit: usize,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            ceiling:                    20_000,
            initial_budget:             20_000 * 2 / 3,
            initial_stride:             50,
            stride_growth:              5,
            stride_after_deadlock:      4,
            deadlock_cut:               1_000,
            budget_floor:               2_000,
            priority_reserve_threshold: 100,
            speed_sort_limit:           10_000,
        }
    }
}

impl AdmissionConfig {
    fn validate(&self) -> TpResult<()> {
        check(self.ceiling > 0, || "admission ceiling must be positive".into())?;
        check(self.initial_budget <= self.ceiling, || {
            format!("initial_budget {} exceeds ceiling {}", self.initial_budget, self.ceiling)
        })?;
        check(self.budget_floor <= self.ceiling, || {
            format!("budget_floor {} exceeds ceiling {}", self.budget_floor, self.ceiling)
        })
    }
}

// ── RecoveryConfig ────────────────────────────────────────────────────────────

/// Snapshot cadence, penalty feedback, and rollback limits.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RecoveryConfig {
    /// A snapshot is captured every this many ticks.
    pub snapshot_interval: u32,
    /// Penalty added per waiting vehicle to its road on deadlock.
    pub penalty_step: f64,
    /// Per-tick linear penalty decay after the last deadlock point.
    pub penalty_decay: f64,
    /// Snapshots walked back on the first deadlock of a macro-time window.
    pub initial_retry_step: u32,
    /// Consecutive deadlocks tolerated without forward progress.
    pub max_rollback_retries: u32,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            snapshot_interval:    20,
            penalty_step:         0.1,
            penalty_decay:        0.01,
            initial_retry_step:   2,
            max_rollback_retries: 200,
        }
    }
}

impl RecoveryConfig {
    fn validate(&self) -> TpResult<()> {
        check(self.snapshot_interval > 0, || "snapshot_interval must be positive".into())?;
        check(self.initial_retry_step > 0, || "initial_retry_step must be positive".into())?;
        check(self.max_rollback_retries > 0, || "max_rollback_retries must be positive".into())?;
        check(finite_non_negative(self.penalty_step), || {
            format!("penalty_step must be finite and >= 0, got {}", self.penalty_step)
        })?;
        check(finite_non_negative(self.penalty_decay), || {
            format!("penalty_decay must be finite and >= 0, got {}", self.penalty_decay)
        })
    }
}

// ── CalibrationConfig ─────────────────────────────────────────────────────────

/// Preset-only dry run that releases the slowest preset vehicles.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CalibrationConfig {
    pub enabled: bool,
    /// Share of preset vehicles released to dynamic routing.
    pub release_fraction: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self { enabled: true, release_fraction: 0.1 }
    }
}

impl CalibrationConfig {
    fn validate(&self) -> TpResult<()> {
        check((0.0..=1.0).contains(&self.release_fraction), || {
            format!("release_fraction must lie in [0, 1], got {}", self.release_fraction)
        })
    }
}
