//! Admission control: how many vehicles may be in transit at once.
//!
//! The budget grows by `stride` after every clean tick, the stride grows at
//! every snapshot, and a rollback cuts the budget back and resets the
//! stride.  Together they form a simple additive-increase backoff.

use tp_core::AdmissionConfig;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Admission {
    pub budget: u32,
    pub stride: u32,
}

impl Admission {
    pub fn new(cfg: &AdmissionConfig) -> Self {
        Self { budget: cfg.initial_budget, stride: cfg.initial_stride }
    }

    /// `true` if one more vehicle may be admitted.
    ///
    /// Once more than `priority_reserve_threshold` priority vehicles are on
    /// the road, regular vehicles only get two thirds of the budget minus the
    /// priority vehicles' share.
    pub fn allows(&self, cfg: &AdmissionConfig, admitted: usize, priority_on_road: usize, priority: bool) -> bool {
        let admitted = admitted as i64;
        let budget = self.budget as i64;
        if !priority && priority_on_road as i64 > cfg.priority_reserve_threshold as i64 {
            admitted < budget * 2 / 3 - priority_on_road as i64
        } else {
            admitted < budget
        }
    }

    pub fn on_clean_tick(&mut self, cfg: &AdmissionConfig) {
        self.budget = cfg.ceiling.min(self.budget.saturating_add(self.stride));
    }

    pub fn on_snapshot(&mut self, cfg: &AdmissionConfig) {
        self.stride = self.stride.saturating_add(cfg.stride_growth);
    }

    /// Back off after rolling back `step` snapshots.
    pub fn on_rollback(&mut self, cfg: &AdmissionConfig, step: u32) {
        let cap = cfg.ceiling / step.saturating_sub(1).max(1);
        self.budget = cap.min(self.budget.saturating_sub(cfg.deadlock_cut)).max(cfg.budget_floor);
        self.stride = cfg.stride_after_deadlock;
    }
}
