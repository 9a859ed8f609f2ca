//! Simulation time model.
//!
//! One `Tick` is one discrete step of the lane simulation.  Vehicles move by
//! at most `min(speed_limit, max_speed)` length units per tick, so a road of
//! length 6 at speed 6 is crossed in exactly one tick.

use std::fmt;

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u32);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Ticks elapsed from `earlier` to `self`, zero if `earlier` is later.
    #[inline]
    pub fn since(self, earlier: Tick) -> u32 {
        self.0.saturating_sub(earlier.0)
    }

    /// Macro-time window this tick falls into, for windows of `width` ticks.
    #[inline]
    pub fn window(self, width: u32) -> u32 {
        self.0 / width.max(1)
    }

    #[inline]
    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl std::ops::Add<u32> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u32) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u32;
    #[inline]
    fn sub(self, rhs: Tick) -> u32 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}
